// Sensor permission handshake
// Some platforms hand out motion events freely, others need an explicit grant

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SensorPermission {
    /// Events are available without asking
    Implicit,
    /// The user granted access when asked
    Granted,
    /// The user refused access
    Denied,
}

/// Outcome of the one-time handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorAccess {
    Enabled,
    Disabled,
}

impl SensorAccess {
    pub fn is_enabled(self) -> bool {
        self == SensorAccess::Enabled
    }
}

/// Run the handshake once before motion delivery starts.
///
/// A refusal is not an error for the player: speed control falls back to
/// the slider for the rest of the session.
pub async fn request_sensor_access(permission: SensorPermission) -> SensorAccess {
    match permission {
        SensorPermission::Implicit => {
            log::debug!("Motion sensor available without a prompt");
            SensorAccess::Enabled
        }
        SensorPermission::Granted => {
            log::info!("Motion sensor permission granted");
            SensorAccess::Enabled
        }
        SensorPermission::Denied => {
            log::error!("Motion sensor permission denied; speed follows the slider only");
            SensorAccess::Disabled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_grants_enable_motion() {
        assert!(request_sensor_access(SensorPermission::Implicit).await.is_enabled());
        assert!(request_sensor_access(SensorPermission::Granted).await.is_enabled());
    }

    #[tokio::test]
    async fn test_denial_disables_motion() {
        assert_eq!(
            request_sensor_access(SensorPermission::Denied).await,
            SensorAccess::Disabled
        );
    }
}
