//! Status and category enums shared by the server and the CLI.
//!
//! Each enum maps to a `PostgreSQL` enum type of the same snake_case name and
//! round-trips through `Display`/`FromStr` with the wire spelling.

use serde::{Deserialize, Serialize};

/// Implements `Display`/`FromStr` from a single variant table.
macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire spelling of the variant.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", $label, ": {}"), s)),
                }
            }
        }
    };
}

/// Kitchen progress of an order.
///
/// Orders move strictly forward: `received → preparing → ready → delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Received,
    Preparing,
    Ready,
    Delivered,
}

string_enum!(OrderStatus, "order status", {
    Received => "received",
    Preparing => "preparing",
    Ready => "ready",
    Delivered => "delivered",
});

impl OrderStatus {
    /// The status that follows this one, or `None` once delivered.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Whether the kitchen still has work to do on the order.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Delivered)
    }
}

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Delivery,
    Pickup,
    DineIn,
}

string_enum!(OrderType, "order type", {
    Delivery => "delivery",
    Pickup => "pickup",
    DineIn => "dine_in",
});

impl OrderType {
    /// Whether the order needs a delivery address and pays the delivery fee.
    #[must_use]
    pub const fn is_delivery(self) -> bool {
        matches!(self, Self::Delivery)
    }

    /// Whether the order is eaten at a table and must name it.
    #[must_use]
    pub const fn is_dine_in(self) -> bool {
        matches!(self, Self::DineIn)
    }
}

/// Payment method chosen at checkout. Payment itself happens off-platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    Card,
    Cash,
}

string_enum!(PaymentMethod, "payment method", {
    Pix => "pix",
    Card => "card",
    Cash => "cash",
});

/// Platform user role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Sees every company and store.
    SuperAdmin,
    /// Sees the companies they own and those companies' stores.
    Owner,
    /// Sees the single store they manage.
    Manager,
    /// Legacy single-restaurant account with no company scope.
    #[default]
    Admin,
}

string_enum!(UserRole, "user role", {
    SuperAdmin => "super_admin",
    Owner => "owner",
    Manager => "manager",
    Admin => "admin",
});

/// Whether a company or store is open for business on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "record_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

string_enum!(RecordStatus, "status", {
    Active => "active",
    Inactive => "inactive",
});

/// Kind of a logged customer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "interaction_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    #[default]
    Note,
    Call,
    Message,
    Order,
    Complaint,
}

string_enum!(InteractionKind, "interaction kind", {
    Note => "note",
    Call => "call",
    Message => "message",
    Order => "order",
    Complaint => "complaint",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_progression() {
        let mut status = OrderStatus::default();
        let mut seen = vec![status];
        while let Some(next) = status.next() {
            seen.push(next);
            status = next;
        }
        assert_eq!(seen, OrderStatus::ALL);
        assert!(!OrderStatus::Delivered.is_active());
        assert!(OrderStatus::Ready.is_active());
    }

    #[test]
    fn test_order_status_rejects_unknown() {
        assert!("pending".parse::<OrderStatus>().is_err());
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert_eq!(
            "preparing".parse::<OrderStatus>().unwrap(),
            OrderStatus::Preparing
        );
    }

    #[test]
    fn test_display_matches_serde() {
        for role in UserRole::ALL {
            let json = serde_json::to_string(role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), *role);
        }
        for kind in OrderType::ALL {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_only_delivery_is_delivery() {
        assert!(OrderType::Delivery.is_delivery());
        assert!(!OrderType::Pickup.is_delivery());
        assert!(!OrderType::DineIn.is_delivery());
        assert!(OrderType::DineIn.is_dine_in());
        assert!(!OrderType::Pickup.is_dine_in());
    }
}
