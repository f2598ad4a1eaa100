//! Coarse user-agent classification.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    Mobile,
    Tablet,
    Desktop,
}

lazy_static! {
    static ref TABLET_PATTERN: Regex =
        Regex::new(r"(?i)tablet|ipad|playbook|silk|kindle").unwrap();
    static ref ANDROID_PATTERN: Regex = Regex::new(r"(?i)android").unwrap();
    static ref MOBI_PATTERN: Regex = Regex::new(r"(?i)mobi").unwrap();
    static ref MOBILE_PATTERN: Regex = Regex::new(
        r"(?i)mobile|iphone|ipod|android|blackberry|iemobile|opera m(obi|ini)|(hpw|web)os"
    )
    .unwrap();
}

impl Device {
    /// Classifies a user-agent string. Unknown or empty agents are `Desktop`.
    pub fn from_user_agent(user_agent: &str) -> Self {
        // Android without "mobi" is a tablet.
        let android_tablet =
            ANDROID_PATTERN.is_match(user_agent) && !MOBI_PATTERN.is_match(user_agent);

        if TABLET_PATTERN.is_match(user_agent) || android_tablet {
            Device::Tablet
        } else if MOBILE_PATTERN.is_match(user_agent) {
            Device::Mobile
        } else {
            Device::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Mobile => "Mobile",
            Device::Tablet => "Tablet",
            Device::Desktop => "Desktop",
        }
    }
}
