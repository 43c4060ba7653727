#![forbid(unsafe_code)]

//! Building-system classification by keyword.

use std::fmt;
use std::str::FromStr;

use bimview_core::model::Equipment;

use crate::error::RenderError;

/// Building system a piece of equipment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemType {
    Electrical,
    Hvac,
    Network,
    Plumbing,
    Fire,
    Security,
    Other,
}

/// Keywords per system, checked in this order.
///
/// Fire and security come first so that "fire alarm panel" and "door
/// controller" are not claimed by the generic electrical words.
static KEYWORDS: &[(SystemType, &[&str])] = &[
    (SystemType::Fire, &["fire", "smoke", "sprinkler", "extinguisher", "alarm"]),
    (
        SystemType::Security,
        &["security", "camera", "cctv", "door", "lock", "reader", "badge", "intrusion"],
    ),
    (
        SystemType::Hvac,
        &["hvac", "ahu", "vav", "rtu", "chiller", "boiler", "thermostat", "damper", "diffuser", "air", "fan"],
    ),
    (
        SystemType::Plumbing,
        &["plumb", "pump", "valve", "water", "pipe", "drain", "toilet", "sink"],
    ),
    (
        SystemType::Electrical,
        &[
            "electric", "panel", "outlet", "receptacle", "breaker", "transformer", "generator", "ups",
            "light", "lamp", "circuit", "switchboard",
        ],
    ),
    (
        SystemType::Network,
        &["network", "switch", "router", "server", "access_point", "wifi", "data", "rack"],
    ),
];

impl SystemType {
    pub const ALL: [SystemType; 7] = [
        Self::Electrical,
        Self::Hvac,
        Self::Network,
        Self::Plumbing,
        Self::Fire,
        Self::Security,
        Self::Other,
    ];

    /// Infer the system from an equipment type and name.
    ///
    /// The type is consulted before the name; no match is [`SystemType::Other`].
    pub fn infer(equipment_type: &str, name: &str) -> Self {
        Self::match_text(equipment_type)
            .or_else(|| Self::match_text(name))
            .unwrap_or(Self::Other)
    }

    #[inline]
    pub fn of(equipment: &Equipment) -> Self {
        Self::infer(&equipment.equipment_type, &equipment.name)
    }

    fn match_text(text: &str) -> Option<Self> {
        let normalized = text.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        if normalized.is_empty() {
            return None;
        }
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| normalized.contains(w)))
            .map(|&(system, _)| system)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electrical => "electrical",
            Self::Hvac => "hvac",
            Self::Network => "network",
            Self::Plumbing => "plumbing",
            Self::Fire => "fire",
            Self::Security => "security",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemType {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "electrical" | "electric" | "power" => Ok(Self::Electrical),
            "hvac" | "mechanical" => Ok(Self::Hvac),
            "network" | "data" | "it" => Ok(Self::Network),
            "plumbing" | "water" => Ok(Self::Plumbing),
            "fire" | "life_safety" => Ok(Self::Fire),
            "security" | "access" => Ok(Self::Security),
            "other" => Ok(Self::Other),
            _ => Err(RenderError::UnknownSystem(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_wins_over_name() {
        assert_eq!(SystemType::infer("outlet", "Server rack feed"), SystemType::Electrical);
        assert_eq!(SystemType::infer("", "Server rack"), SystemType::Network);
    }

    #[test]
    fn specific_systems_before_generic_words() {
        assert_eq!(SystemType::infer("Fire Alarm Panel", ""), SystemType::Fire);
        assert_eq!(SystemType::infer("door controller", ""), SystemType::Security);
        assert_eq!(SystemType::infer("light switch", ""), SystemType::Electrical);
        assert_eq!(SystemType::infer("network switch", ""), SystemType::Network);
        assert_eq!(SystemType::infer("AHU-1", ""), SystemType::Hvac);
        assert_eq!(SystemType::infer("chiller", ""), SystemType::Hvac);
        assert_eq!(SystemType::infer("domestic water pump", ""), SystemType::Plumbing);
        assert_eq!(SystemType::infer("mystery", "box"), SystemType::Other);
    }

    #[test]
    fn parse_names_and_aliases() {
        assert_eq!("HVAC".parse::<SystemType>(), Ok(SystemType::Hvac));
        assert_eq!("power".parse::<SystemType>(), Ok(SystemType::Electrical));
        assert_eq!(
            "teleport".parse::<SystemType>(),
            Err(RenderError::UnknownSystem("teleport".into()))
        );
        for system in SystemType::ALL {
            assert_eq!(system.as_str().parse::<SystemType>(), Ok(system));
        }
    }
}
