mod schedule;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A named-parameter violation in a job description. The message always
/// names the offending parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidChronosConfigError(pub String);

/// Every parameter the formatter will accept. Anything else in a job
/// description is rejected by name.
const SUPPORTED_PARAMS: &[&str] = &[
	"name",
	"description",
	"command",
	"schedule",
	"schedule_time_zone",
	"epsilon",
	"retries",
	"async",
	"cpus",
	"mem",
	"disk",
	"owner",
	"disabled",
	"container",
	"parents",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
	Scheduled,
	Dependent,
	Docker,
}

impl JobType {
	pub fn as_str(&self) -> &'static str {
		match self {
			JobType::Scheduled => "scheduled",
			JobType::Dependent => "dependent",
			JobType::Docker => "docker",
		}
	}

	fn required_params(&self) -> &'static [&'static str] {
		match self {
			JobType::Scheduled => &["name", "schedule"],
			JobType::Dependent => &["name", "parents"],
			JobType::Docker => &["name", "container"],
		}
	}
}

impl FromStr for JobType {
	type Err = InvalidChronosConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"scheduled" => Ok(JobType::Scheduled),
			"dependent" => Ok(JobType::Dependent),
			"docker" => Ok(JobType::Docker),
			_ => Err(InvalidChronosConfigError(format!(
				"'{s}' is not a supported job type. Aborting job requirements check."
			))),
		}
	}
}

/// A user-supplied scheduled-job description. Parameters stay loosely typed
/// until [`format_job`] validates them, so the per-parameter checks can
/// report what the user actually wrote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChronosJobConfig {
	params: Map<String, Value>,
}

fn ok() -> (bool, String) {
	(true, String::new())
}

/// Renders a parameter value the way the user wrote it: strings without
/// quotes, everything else as JSON.
fn display_value(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

impl ChronosJobConfig {
	pub fn new(params: Map<String, Value>) -> Self {
		ChronosJobConfig { params }
	}

	pub fn from_value(value: Value) -> Result<Self, InvalidChronosConfigError> {
		match value {
			Value::Object(params) => Ok(ChronosJobConfig { params }),
			_ => Err(InvalidChronosConfigError(
				"Your Chronos config must be a mapping of parameters.".to_string(),
			)),
		}
	}

	pub fn params(&self) -> &Map<String, Value> {
		&self.params
	}

	pub fn get(&self, param: &str) -> Option<&Value> {
		self.params.get(param)
	}

	/// Validates one parameter, dispatching to its checker. Parameters
	/// without a checker pass as long as they are supported at all.
	pub fn check(&self, param: &str) -> (bool, String) {
		match param {
			"epsilon" => self.check_epsilon(),
			"retries" => self.check_retries(),
			"async" => self.check_async(),
			"cpus" | "mem" | "disk" => self.check_resource(param),
			"schedule" => self.check_schedule(),
			"schedule_time_zone" => self.check_schedule_time_zone(),
			param if SUPPORTED_PARAMS.contains(&param) => ok(),
			_ => (
				false,
				format!("Your Chronos config specifies '{param}', an unsupported parameter."),
			),
		}
	}

	fn check_epsilon(&self) -> (bool, String) {
		let Some(value) = self.get("epsilon") else {
			return ok();
		};

		let valid = value
			.as_str()
			.map(|s| iso8601::duration(s).is_ok())
			.unwrap_or(false);
		if valid {
			ok()
		} else {
			(
				false,
				format!(
					"The specified epsilon value '{}' does not conform to the ISO8601 format.",
					display_value(value)
				),
			)
		}
	}

	fn check_retries(&self) -> (bool, String) {
		let Some(value) = self.get("retries") else {
			return ok();
		};

		if value.as_u64().is_some() {
			ok()
		} else {
			(
				false,
				format!(
					"The specified retries value '{}' is not a valid int.",
					display_value(value)
				),
			)
		}
	}

	fn check_async(&self) -> (bool, String) {
		match self.get("async") {
			None | Some(Value::Bool(false)) | Some(Value::Null) => ok(),
			Some(_) => (
				false,
				"The config specifies that the job is async, which we don't support.".to_string(),
			),
		}
	}

	fn check_resource(&self, param: &str) -> (bool, String) {
		let Some(value) = self.get(param) else {
			return ok();
		};

		match value.as_f64() {
			Some(number) if number > 0.0 && number.is_finite() => ok(),
			Some(_) => (
				false,
				format!(
					"The specified {param} value '{}' must be a positive number.",
					display_value(value)
				),
			),
			None => (
				false,
				format!(
					"The specified {param} value '{}' is not a valid float.",
					display_value(value)
				),
			),
		}
	}

	fn check_schedule(&self) -> (bool, String) {
		let Some(value) = self.get("schedule") else {
			return ok();
		};

		let Some(sched) = value.as_str() else {
			return (
				false,
				format!(
					"The specified schedule '{}' does not conform to the ISO 8601 format.",
					display_value(value)
				),
			);
		};

		// R[n]/[start]/interval
		let parts = sched.split('/').collect::<Vec<_>>();
		if parts.len() != 3 {
			return (
				false,
				format!("The specified schedule '{sched}' does not conform to the ISO 8601 format."),
			);
		}
		let (repeat, start, interval) = (parts[0], parts[1], parts[2]);

		// An empty start means "from now"
		if !start.is_empty() {
			if let Err(detail) = schedule::check_start_time(start) {
				return (
					false,
					format!(
						"The specified start time '{start}' in schedule '{sched}' does not \
						 conform to the ISO 8601 format:\n{detail}"
					),
				);
			}
		}

		if !schedule::check_interval(interval) {
			return (
				false,
				format!(
					"The specified interval '{interval}' in schedule '{sched}' does not conform \
					 to the ISO 8601 format."
				),
			);
		}

		if !schedule::check_repeat(repeat) {
			return (
				false,
				format!(
					"The specified repeat '{repeat}' in schedule '{sched}' does not conform to \
					 the ISO 8601 format."
				),
			);
		}

		ok()
	}

	fn check_schedule_time_zone(&self) -> (bool, String) {
		let Some(value) = self.get("schedule_time_zone") else {
			return ok();
		};

		let Some(tz) = value.as_str() else {
			return (
				false,
				format!(
					"The specified time zone '{}' does not conform to the tz database format.",
					display_value(value)
				),
			);
		};

		// Empty means "use the schedule's zone"
		if tz.is_empty() || tz.parse::<chrono_tz::Tz>().is_ok() {
			ok()
		} else {
			(
				false,
				format!("The specified time zone '{tz}' does not conform to the tz database format."),
			)
		}
	}
}

/// Fills absent parameters from the Chronos defaults table. Present
/// parameters are never touched, so the operation is idempotent.
pub fn set_defaults(config: &ChronosJobConfig) -> ChronosJobConfig {
	let defaults: [(&str, Value); 6] = [
		("epsilon", json!("PT60S")),
		("retries", json!(2)),
		("cpus", json!(0.1)),
		("mem", json!(128)),
		("disk", json!(256)),
		("disabled", json!(false)),
	];

	let mut params = config.params.clone();
	for (param, value) in defaults {
		params.entry(param.to_string()).or_insert(value);
	}

	ChronosJobConfig { params }
}

/// Checks that the job description carries every field its job type
/// requires. Docker jobs additionally need exactly one of `schedule` or
/// `parents`.
pub fn check_job_reqs(config: &ChronosJobConfig, job_type: &str) -> (bool, Vec<String>) {
	let job_type = match job_type.parse::<JobType>() {
		Ok(job_type) => job_type,
		Err(err) => return (false, vec![err.0]),
	};

	let mut msgs = Vec::new();
	for param in job_type.required_params() {
		if config.get(param).is_none() {
			msgs.push(format!(
				"Your Chronos config is missing '{param}', a required parameter for a '{} job'.",
				job_type.as_str()
			));
		}
	}

	if job_type == JobType::Docker {
		let has_schedule = config.get("schedule").is_some();
		let has_parents = config.get("parents").is_some();
		match (has_schedule, has_parents) {
			(true, true) => msgs.push(format!(
				"Your Chronos config contains both 'schedule' and 'parents'. Only one may be \
				 specified for a '{} job'.",
				job_type.as_str()
			)),
			(false, false) => msgs.push(format!(
				"Your Chronos config contains neither 'schedule' nor 'parents'. One is required \
				 for a '{} job'.",
				job_type.as_str()
			)),
			_ => {}
		}
	}

	(msgs.is_empty(), msgs)
}

/// Applies defaults, validates every parameter, and returns a fully
/// specified job dictionary ready for submission.
pub fn format_job(
	config: &ChronosJobConfig,
	job_type: &str,
) -> Result<Map<String, Value>, InvalidChronosConfigError> {
	let mut complete = set_defaults(config);
	complete
		.params
		.entry("async".to_string())
		.or_insert(json!(false));

	for param in complete.params.keys() {
		let (valid, msg) = complete.check(param);
		if !valid {
			return Err(InvalidChronosConfigError(msg));
		}
	}

	let (reqs_ok, msgs) = check_job_reqs(&complete, job_type);
	if !reqs_ok {
		return Err(InvalidChronosConfigError(msgs.join("\n")));
	}

	Ok(complete.params)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(value: Value) -> ChronosJobConfig {
		ChronosJobConfig::from_value(value).unwrap()
	}

	fn complete_config() -> ChronosJobConfig {
		config(json!({
			"name": "test",
			"description": "This is a test Chronos job.",
			"command": "/bin/sleep 40",
			"epsilon": "PT30M",
			"retries": 5,
			"owner": "test@test.com",
			"async": false,
			"cpus": 5.5,
			"mem": 1024.4,
			"disk": 2048.5,
			"disabled": true,
			"schedule": "R/2015-03-25T19:36:35Z/PT5M",
			"schedule_time_zone": "Zulu",
		}))
	}

	#[test]
	fn check_epsilon() {
		assert_eq!(complete_config().check("epsilon"), (true, String::new()));

		let (valid, msg) = config(json!({"epsilon": "nolispe"})).check("epsilon");
		assert!(!valid);
		assert_eq!(
			msg,
			"The specified epsilon value 'nolispe' does not conform to the ISO8601 format."
		);
	}

	#[test]
	fn check_retries() {
		assert_eq!(complete_config().check("retries"), (true, String::new()));

		let (valid, msg) = config(json!({"retries": 5.7})).check("retries");
		assert!(!valid);
		assert_eq!(msg, "The specified retries value '5.7' is not a valid int.");

		let (valid, _) = config(json!({"retries": -2})).check("retries");
		assert!(!valid);
	}

	#[test]
	fn check_async() {
		assert_eq!(complete_config().check("async"), (true, String::new()));

		let (valid, msg) = config(json!({"async": true})).check("async");
		assert!(!valid);
		assert_eq!(
			msg,
			"The config specifies that the job is async, which we don't support."
		);
	}

	#[test]
	fn check_resources() {
		let complete = complete_config();
		for param in ["cpus", "mem", "disk"] {
			assert_eq!(complete.check(param), (true, String::new()));
		}

		let invalid = config(json!({"cpus": "intel", "mem": "lots", "disk": "all of it"}));
		let (valid, msg) = invalid.check("cpus");
		assert!(!valid);
		assert_eq!(msg, "The specified cpus value 'intel' is not a valid float.");
		let (valid, msg) = invalid.check("mem");
		assert!(!valid);
		assert_eq!(msg, "The specified mem value 'lots' is not a valid float.");
		let (valid, _) = invalid.check("disk");
		assert!(!valid);

		let (valid, msg) = config(json!({"cpus": -1.0})).check("cpus");
		assert!(!valid);
		assert_eq!(msg, "The specified cpus value '-1.0' must be a positive number.");
	}

	#[test]
	fn check_schedule_accepts_valid_forms() {
		for sched in [
			"R/2015-03-25T19:36:35Z/PT5M",
			"R10/2015-03-25T19:36:35Z/PT5M",
			"R10//PT2S",
		] {
			let (valid, msg) = config(json!({ "schedule": sched })).check("schedule");
			assert!(valid, "{sched}: {msg}");
			assert_eq!(msg, "");
		}
	}

	#[test]
	fn check_schedule_rejects_bad_repeat() {
		for sched in ["forever//PT2S", "R6.9//PT2S", "R-8//PT2S", "BR72//PT2S", "//PT2S"] {
			let (valid, msg) = config(json!({ "schedule": sched })).check("schedule");
			assert!(!valid, "{sched}");
			assert!(msg.starts_with("The specified repeat"), "{msg}");
		}
	}

	#[test]
	fn check_schedule_rejects_bad_interval() {
		let (valid, msg) = config(json!({"schedule": "R10//"})).check("schedule");
		assert!(!valid);
		assert_eq!(
			msg,
			"The specified interval '' in schedule 'R10//' does not conform to the ISO 8601 format."
		);

		let (valid, msg) = config(json!({"schedule": "R10//Mondays"})).check("schedule");
		assert!(!valid);
		assert_eq!(
			msg,
			"The specified interval 'Mondays' in schedule 'R10//Mondays' does not conform to the ISO 8601 format."
		);
	}

	#[test]
	fn check_schedule_rejects_bad_start_time() {
		let (valid, msg) = config(json!({"schedule": "R10/now/PT2S"})).check("schedule");
		assert!(!valid);
		assert_eq!(
			msg,
			"The specified start time 'now' in schedule 'R10/now/PT2S' does not conform to the \
			 ISO 8601 format:\nISO 8601 time designator 'T' missing. Unable to parse datetime \
			 string 'now'"
		);

		let (valid, _) = config(json!({"schedule": "R10/todayT19:20:30Z/PT2S"})).check("schedule");
		assert!(!valid);
	}

	#[test]
	fn check_schedule_time_zone() {
		assert_eq!(
			complete_config().check("schedule_time_zone"),
			(true, String::new())
		);
		assert_eq!(
			config(json!({"schedule_time_zone": ""})).check("schedule_time_zone"),
			(true, String::new())
		);
		for tz in ["UTC", "America/New_York", "Zulu"] {
			let (valid, _) = config(json!({ "schedule_time_zone": tz })).check("schedule_time_zone");
			assert!(valid, "{tz}");
		}

		let (valid, msg) = config(json!({"schedule_time_zone": "+0200"})).check("schedule_time_zone");
		assert!(!valid);
		assert_eq!(
			msg,
			"The specified time zone '+0200' does not conform to the tz database format."
		);
	}

	#[test]
	fn check_unknown_param() {
		let (valid, msg) = complete_config().check("boat");
		assert!(!valid);
		assert_eq!(
			msg,
			"Your Chronos config specifies 'boat', an unsupported parameter."
		);
	}

	#[test]
	fn check_param_without_checker() {
		assert_eq!(complete_config().check("name"), (true, String::new()));
	}

	#[test]
	fn defaults_fill_missing_params() {
		let completed = set_defaults(&ChronosJobConfig::default());

		assert_eq!(completed.get("epsilon"), Some(&json!("PT60S")));
		assert_eq!(completed.get("retries"), Some(&json!(2)));
		assert_eq!(completed.get("cpus"), Some(&json!(0.1)));
		assert_eq!(completed.get("mem"), Some(&json!(128)));
		assert_eq!(completed.get("disk"), Some(&json!(256)));
		assert_eq!(completed.get("disabled"), Some(&json!(false)));
	}

	#[test]
	fn defaults_never_override() {
		let initial = config(json!({
			"epsilon": "PT5M",
			"retries": 5,
			"cpus": 7.2,
			"mem": 9001,
			"disk": 8,
			"disabled": true,
		}));

		let completed = set_defaults(&initial);
		assert_eq!(completed, initial);
	}

	#[test]
	fn defaults_are_idempotent() {
		let once = set_defaults(&ChronosJobConfig::default());
		let twice = set_defaults(&once);
		assert_eq!(once, twice);
	}

	#[test]
	fn job_reqs_scheduled() {
		let (reqs_ok, msgs) = check_job_reqs(&complete_config(), "scheduled");
		assert!(reqs_ok, "{msgs:?}");

		let (reqs_ok, msgs) = check_job_reqs(&ChronosJobConfig::default(), "scheduled");
		assert!(!reqs_ok);
		assert!(msgs.contains(
			&"Your Chronos config is missing 'name', a required parameter for a 'scheduled job'."
				.to_string()
		));
		assert!(msgs.contains(
			&"Your Chronos config is missing 'schedule', a required parameter for a 'scheduled job'."
				.to_string()
		));
	}

	#[test]
	fn job_reqs_dependent() {
		let (reqs_ok, msgs) =
			check_job_reqs(&config(json!({"name": "test", "parents": ["jack", "jill"]})), "dependent");
		assert!(reqs_ok, "{msgs:?}");

		let (reqs_ok, msgs) = check_job_reqs(&ChronosJobConfig::default(), "dependent");
		assert!(!reqs_ok);
		assert!(msgs.contains(
			&"Your Chronos config is missing 'parents', a required parameter for a 'dependent job'."
				.to_string()
		));
	}

	#[test]
	fn job_reqs_docker() {
		let container = json!({
			"type": "DOCKER",
			"image": "libmesos/ubuntu",
			"network": "BRIDGE",
		});

		let (reqs_ok, msgs) = check_job_reqs(
			&config(json!({
				"name": "test",
				"schedule": "R/2015-03-25T19:36:35Z/PT5M",
				"container": container.clone(),
			})),
			"docker",
		);
		assert!(reqs_ok, "{msgs:?}");

		let (reqs_ok, msgs) = check_job_reqs(&ChronosJobConfig::default(), "docker");
		assert!(!reqs_ok);
		assert!(msgs.contains(
			&"Your Chronos config is missing 'container', a required parameter for a 'docker job'."
				.to_string()
		));

		// neither schedule nor parents
		let (reqs_ok, msgs) = check_job_reqs(
			&config(json!({"name": "test", "container": container.clone()})),
			"docker",
		);
		assert!(!reqs_ok);
		assert_eq!(
			msgs,
			["Your Chronos config contains neither 'schedule' nor 'parents'. One is required for a 'docker job'."]
		);

		// both schedule and parents
		let (reqs_ok, msgs) = check_job_reqs(
			&config(json!({
				"name": "test",
				"container": container,
				"schedule": "R/2015-03-25T19:36:35Z/PT5M",
				"parents": ["jack", "jill"],
			})),
			"docker",
		);
		assert!(!reqs_ok);
		assert_eq!(
			msgs,
			["Your Chronos config contains both 'schedule' and 'parents'. Only one may be specified for a 'docker job'."]
		);
	}

	#[test]
	fn job_reqs_unknown_type() {
		let (reqs_ok, msgs) = check_job_reqs(&ChronosJobConfig::default(), "boogaloo");
		assert!(!reqs_ok);
		assert_eq!(
			msgs,
			["'boogaloo' is not a supported job type. Aborting job requirements check."]
		);
	}

	#[test]
	fn format_fills_defaults_and_async() {
		let incomplete = config(json!({
			"name": "test_service",
			"description": "this service is just a test",
			"command": "echo foo >> /tmp/test_service_log",
			"schedule": "R10/2012-10-01T05:52:00Z/PT1M",
			"owner": "bob@example.com",
		}));

		let formatted = format_job(&incomplete, "scheduled").unwrap();

		let expected = json!({
			"name": "test_service",
			"description": "this service is just a test",
			"command": "echo foo >> /tmp/test_service_log",
			"schedule": "R10/2012-10-01T05:52:00Z/PT1M",
			"epsilon": "PT60S",
			"owner": "bob@example.com",
			"async": false,
			"cpus": 0.1,
			"mem": 128,
			"disk": 256,
			"retries": 2,
			"disabled": false,
		});
		assert_eq!(Value::Object(formatted), expected);
	}

	#[test]
	fn format_rejects_unsupported_param() {
		let with_extra = config(json!({
			"name": "test_service",
			"schedule": "R10/2012-10-01T05:52:00Z/PT1M",
			"ship": "Titanic",
		}));

		let err = format_job(&with_extra, "scheduled").unwrap_err();
		assert_eq!(
			err.0,
			"Your Chronos config specifies 'ship', an unsupported parameter."
		);
	}

	#[test]
	fn format_rejects_missing_required_param() {
		let missing_name = config(json!({
			"description": "this service is just a test",
			"command": "echo foo",
			"schedule": "R10/2012-10-01T05:52:00Z/PT1M",
			"owner": "bob@example.com",
		}));

		let err = format_job(&missing_name, "scheduled").unwrap_err();
		assert_eq!(
			err.0,
			"Your Chronos config is missing 'name', a required parameter for a 'scheduled job'."
		);
	}
}
