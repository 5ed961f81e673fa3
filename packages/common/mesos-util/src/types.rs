use serde::Deserialize;

/// Subset of the master `/master/state` payload the autoscaler consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MesosState {
	#[serde(default)]
	pub slaves: Vec<MesosSlave>,
	#[serde(default)]
	pub frameworks: Vec<MesosFramework>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MesosSlave {
	pub id: String,
	pub hostname: String,
	/// Of the form `slave(N)@<ip>:<port>`.
	pub pid: String,
	#[serde(default)]
	pub attributes: SlaveAttributes,
	#[serde(default)]
	pub resources: ResourceInfo,
	#[serde(default)]
	pub used_resources: ResourceInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlaveAttributes {
	#[serde(default)]
	pub pool: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ResourceInfo {
	#[serde(default)]
	pub cpus: f64,
	#[serde(default)]
	pub mem: f64,
	#[serde(default)]
	pub disk: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MesosFramework {
	pub name: String,
	#[serde(default)]
	pub tasks: Vec<MesosTask>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MesosTask {
	pub slave_id: String,
	pub state: String,
}

/// Running task totals for one slave.
#[derive(Debug, Clone)]
pub struct SlaveTaskCount {
	pub slave: MesosSlave,
	pub count: u64,
	/// Tasks launched by a chronos framework. These bias the slave selector
	/// away from killing the host.
	pub chronos_count: u64,
}

/// Free and total resources over one group of slaves.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UtilizationSnapshot {
	pub free: ResourceInfo,
	pub total: ResourceInfo,
}
