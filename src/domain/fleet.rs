// Fleet domain model
use serde::Serialize;

/// States (app status or machine state) that need a human to look at them.
const TROUBLE_STATES: [&str; 4] = ["suspended", "failed", "stopped", "dead"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetMachine {
    pub id: String,
    pub name: String,
    pub state: String,
    pub region: String,
    pub image: String,
}

impl FleetMachine {
    pub fn new(id: String, name: String, state: String, region: String, image: String) -> Self {
        Self {
            id,
            name,
            state,
            region,
            image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetAppInfo {
    pub name: String,
    pub org_slug: String,
    pub status: String,
    pub hostname: String,
    pub machines: Vec<FleetMachine>,
}

impl FleetAppInfo {
    pub fn new(
        name: String,
        org_slug: String,
        status: String,
        hostname: String,
        machines: Vec<FleetMachine>,
    ) -> Self {
        Self {
            name,
            org_slug,
            status,
            hostname,
            machines,
        }
    }

    pub fn has_issues(&self) -> bool {
        is_trouble_state(&self.status) || self.machines.iter().any(|m| is_trouble_state(&m.state))
    }
}

fn is_trouble_state(state: &str) -> bool {
    TROUBLE_STATES
        .iter()
        .any(|trouble| trouble.eq_ignore_ascii_case(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(status: &str, machine_states: &[&str]) -> FleetAppInfo {
        let machines = machine_states
            .iter()
            .enumerate()
            .map(|(i, state)| {
                FleetMachine::new(
                    format!("m{}", i),
                    "web".to_string(),
                    state.to_string(),
                    "iad".to_string(),
                    String::new(),
                )
            })
            .collect();
        FleetAppInfo::new(
            "a".to_string(),
            "org".to_string(),
            status.to_string(),
            String::new(),
            machines,
        )
    }

    #[test]
    fn test_trouble_state_is_case_insensitive() {
        assert!(is_trouble_state("Suspended"));
        assert!(is_trouble_state("DEAD"));
        assert!(!is_trouble_state("deployed"));
        assert!(!is_trouble_state(""));
    }

    #[test]
    fn test_has_issues() {
        assert!(!app("deployed", &["started"]).has_issues());
        assert!(app("deployed", &["started", "failed"]).has_issues());
        assert!(app("dead", &[]).has_issues());
        assert!(app("deployed", &["Stopped"]).has_issues());
    }
}
