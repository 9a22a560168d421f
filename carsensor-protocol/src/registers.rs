//! Register addresses of the host protocol
//!
//! Registers are one byte wide. Addresses, directions and widths are the
//! wire contract with the host and must not change.

// Read-only registers
pub const REG_VERSION_MAJOR: u8 = 0x00;
pub const REG_VERSION_MINOR: u8 = 0x01;
pub const REG_VERSION_PATCH: u8 = 0x02;
pub const REG_SENSOR_COUNT: u8 = 0x03;
pub const REG_OUTPUT_COUNT: u8 = 0x04;
pub const REG_SENSOR_STATE: u8 = 0x10;

// Write-only registers
pub const REG_LOCAL_OUTPUT: u8 = 0x20;
pub const REG_REMOTE_OUTPUT_BASE: u8 = 0x21;
pub const REG_PWM_DUTY_BASE: u8 = 0x30;

/// Number of expander output registers (0x21-0x28)
pub const REMOTE_OUTPUT_REGISTERS: u8 = 8;

/// Number of PWM duty registers (0x30-0x37)
pub const PWM_DUTY_REGISTERS: u8 = 8;

/// Firmware version reported in registers 0x00-0x02
pub const FIRMWARE_VERSION: [u8; 3] = [0, 0, 1];

/// Register access direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Host reads, board answers
    Read,
    /// Host writes one value byte
    Write,
}

/// A decoded register address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    VersionMajor,
    VersionMinor,
    VersionPatch,
    /// Number of sensor channels
    SensorCount,
    /// Number of expander output bits (8 per expander)
    OutputCount,
    /// Sticky sensor status byte
    SensorState,
    /// Local actuator pins, one bit per pin
    LocalOutput,
    /// Output byte for expander N
    RemoteOutput(u8),
    /// PWM duty for local pin N
    PwmDuty(u8),
    /// Any address outside the map
    Unknown(u8),
}

impl Register {
    /// Decode a register address
    pub fn from_addr(addr: u8) -> Self {
        match addr {
            REG_VERSION_MAJOR => Register::VersionMajor,
            REG_VERSION_MINOR => Register::VersionMinor,
            REG_VERSION_PATCH => Register::VersionPatch,
            REG_SENSOR_COUNT => Register::SensorCount,
            REG_OUTPUT_COUNT => Register::OutputCount,
            REG_SENSOR_STATE => Register::SensorState,
            REG_LOCAL_OUTPUT => Register::LocalOutput,
            a if (REG_REMOTE_OUTPUT_BASE..REG_REMOTE_OUTPUT_BASE + REMOTE_OUTPUT_REGISTERS)
                .contains(&a) =>
            {
                Register::RemoteOutput(a - REG_REMOTE_OUTPUT_BASE)
            }
            a if (REG_PWM_DUTY_BASE..REG_PWM_DUTY_BASE + PWM_DUTY_REGISTERS).contains(&a) => {
                Register::PwmDuty(a - REG_PWM_DUTY_BASE)
            }
            a => Register::Unknown(a),
        }
    }

    /// Wire address of this register
    pub fn addr(self) -> u8 {
        match self {
            Register::VersionMajor => REG_VERSION_MAJOR,
            Register::VersionMinor => REG_VERSION_MINOR,
            Register::VersionPatch => REG_VERSION_PATCH,
            Register::SensorCount => REG_SENSOR_COUNT,
            Register::OutputCount => REG_OUTPUT_COUNT,
            Register::SensorState => REG_SENSOR_STATE,
            Register::LocalOutput => REG_LOCAL_OUTPUT,
            Register::RemoteOutput(n) => REG_REMOTE_OUTPUT_BASE + n,
            Register::PwmDuty(n) => REG_PWM_DUTY_BASE + n,
            Register::Unknown(a) => a,
        }
    }

    /// Access direction, `None` for addresses outside the map
    pub fn direction(self) -> Option<Direction> {
        match self {
            Register::VersionMajor
            | Register::VersionMinor
            | Register::VersionPatch
            | Register::SensorCount
            | Register::OutputCount
            | Register::SensorState => Some(Direction::Read),
            Register::LocalOutput | Register::RemoteOutput(_) | Register::PwmDuty(_) => {
                Some(Direction::Write)
            }
            Register::Unknown(_) => None,
        }
    }

    /// Returns true if the host may read this register
    pub fn is_readable(self) -> bool {
        self.direction() == Some(Direction::Read)
    }

    /// Returns true if the host may write this register
    pub fn is_writable(self) -> bool {
        self.direction() == Some(Direction::Write)
    }
}

impl From<u8> for Register {
    fn from(addr: u8) -> Self {
        Register::from_addr(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_addresses() {
        assert_eq!(Register::from_addr(0x00), Register::VersionMajor);
        assert_eq!(Register::from_addr(0x02), Register::VersionPatch);
        assert_eq!(Register::from_addr(0x03), Register::SensorCount);
        assert_eq!(Register::from_addr(0x04), Register::OutputCount);
        assert_eq!(Register::from_addr(0x10), Register::SensorState);
        assert_eq!(Register::from_addr(0x20), Register::LocalOutput);
    }

    #[test]
    fn test_remote_output_range() {
        assert_eq!(Register::from_addr(0x21), Register::RemoteOutput(0));
        assert_eq!(Register::from_addr(0x28), Register::RemoteOutput(7));
        assert_eq!(Register::from_addr(0x29), Register::Unknown(0x29));
    }

    #[test]
    fn test_pwm_range() {
        assert_eq!(Register::from_addr(0x30), Register::PwmDuty(0));
        assert_eq!(Register::from_addr(0x37), Register::PwmDuty(7));
        assert_eq!(Register::from_addr(0x38), Register::Unknown(0x38));
        assert_eq!(Register::from_addr(0x2F), Register::Unknown(0x2F));
    }

    #[test]
    fn test_directions() {
        assert!(Register::SensorState.is_readable());
        assert!(!Register::SensorState.is_writable());
        assert!(Register::LocalOutput.is_writable());
        assert!(!Register::LocalOutput.is_readable());
        assert_eq!(Register::Unknown(0x55).direction(), None);
    }

    proptest! {
        #[test]
        fn prop_address_is_preserved(addr in any::<u8>()) {
            prop_assert_eq!(Register::from_addr(addr).addr(), addr);
        }
    }
}
