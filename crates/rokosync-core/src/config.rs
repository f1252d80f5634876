use serde::{Deserialize, Serialize};
use std::fmt;

/// The two external systems a session drives
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    /// Rokoko Studio, controlled over its local HTTP API
    Mocap,
    /// Audacity, controlled over mod-script-pipe
    Workstation,
}

impl Subsystem {
    /// Get the string identifier for this subsystem
    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Mocap => "mocap",
            Subsystem::Workstation => "workstation",
        }
    }

    /// Human-readable name of the application behind this subsystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Subsystem::Mocap => "Rokoko",
            Subsystem::Workstation => "Audacity",
        }
    }

    /// Both subsystems, in start order
    pub fn all() -> &'static [Subsystem] {
        &[Subsystem::Mocap, Subsystem::Workstation]
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Subsystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mocap" | "rokoko" => Ok(Subsystem::Mocap),
            "workstation" | "audacity" | "audio" => Ok(Subsystem::Workstation),
            _ => Err(format!(
                "Unknown subsystem: {}. Available: mocap, workstation",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_from_str_aliases() {
        assert_eq!("Rokoko".parse::<Subsystem>().unwrap(), Subsystem::Mocap);
        assert_eq!("audio".parse::<Subsystem>().unwrap(), Subsystem::Workstation);
        assert!("video".parse::<Subsystem>().is_err());
    }

    #[test]
    fn test_subsystem_display_uses_app_name() {
        assert_eq!(Subsystem::Workstation.to_string(), "Audacity");
        assert_eq!(Subsystem::Mocap.as_str(), "mocap");
    }
}
