// ABOUTME: Shared domain enums persisted as uppercase text columns
// ABOUTME: Providers, plans, statuses, symbol categories, and the analyze caller identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: {value}. Supported: {supported}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub supported: String,
}

/// Declares a text-backed enum with its stored representation.
/// Parsing is case-insensitive; display and serde use the stored form.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            pub fn all() -> Vec<Self> {
                vec![$(Self::$variant),+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                        supported: [$($text),+].join(", "),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ParseEnumError;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

text_enum! {
    /// Identity provider a member signed in with
    SocialProvider, "provider" {
        Kakao => "KAKAO",
        Google => "GOOGLE",
    }
}

text_enum! {
    /// Subscription tier: unlimited for a month, or a prepaid block of analyses
    PlanType, "plan type" {
        Monthly => "MONTHLY",
        Credits => "CREDITS",
    }
}

text_enum! {
    SubscriptionStatus, "subscription status" {
        Active => "ACTIVE",
        Cancelled => "CANCELLED",
        Expired => "EXPIRED",
    }
}

text_enum! {
    PaymentStatus, "payment status" {
        Pending => "PENDING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Cancelled => "CANCELLED",
    }
}

text_enum! {
    /// Care label symbol group
    SymbolCategory, "symbol category" {
        Wash => "WASH",
        Bleach => "BLEACH",
        Dry => "DRY",
        Iron => "IRON",
        Dryclean => "DRYCLEAN",
    }
}

text_enum! {
    /// How often a symbol shows up on labels of a material
    Frequency, "frequency" {
        Always => "ALWAYS",
        Often => "OFTEN",
        Sometimes => "SOMETIMES",
    }
}

text_enum! {
    /// Metered actions recorded in the usage log
    UsageAction, "usage action" {
        Analyze => "ANALYZE",
    }
}

impl Frequency {
    /// Sort rank, most common first
    pub fn rank(&self) -> u8 {
        match self {
            Self::Always => 0,
            Self::Often => 1,
            Self::Sometimes => 2,
        }
    }
}

/// Who is spending an analysis: a signed-in member or an anonymous guest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageIdentity {
    Member(String),
    Guest(String),
}

impl UsageIdentity {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Member(id) => Some(id),
            Self::Guest(_) => None,
        }
    }

    pub fn guest_id(&self) -> Option<&str> {
        match self {
            Self::Member(_) => None,
            Self::Guest(id) => Some(id),
        }
    }
}

impl fmt::Display for UsageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(id) => write!(f, "user:{}", id),
            Self::Guest(id) => write!(f, "guest:{}", id),
        }
    }
}
