use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	// `R` optionally followed by a repeat count; `R` alone repeats forever
	static ref REPEAT: Regex = Regex::new(r"^R(\d+)?$").unwrap();
}

/// Validates the repeat token of a schedule, e.g. `R`, `R10`.
pub(crate) fn check_repeat(repeat: &str) -> bool {
	REPEAT.is_match(repeat)
}

/// Validates the start time token of a schedule. An empty start means "from
/// now" and is handled by the caller.
pub(crate) fn check_start_time(start: &str) -> Result<(), String> {
	if !start.contains('T') {
		return Err(format!(
			"ISO 8601 time designator 'T' missing. Unable to parse datetime string '{start}'"
		));
	}

	iso8601::datetime(start).map(|_| ())
}

/// Validates the interval token of a schedule, e.g. `PT5M`.
pub(crate) fn check_interval(interval: &str) -> bool {
	iso8601::duration(interval).is_ok()
}
