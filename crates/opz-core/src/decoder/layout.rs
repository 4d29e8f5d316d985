pub const STATUS_OFFSET: usize = 0;
pub const DATA1_OFFSET: usize = 1;
pub const DATA2_OFFSET: usize = 2;

pub const CONTROL_LEN: usize = 1;
pub const UNSUPPORTED_LEN: usize = 2;
pub const CHANNEL_LEN: usize = 3;

pub const VELOCITY_ABSENT: i16 = -1;

pub const PITCH_CLASSES: u8 = 12;
pub const DIALS_PER_PAGE: i16 = 4;
pub const DIAL_KEY_MODULUS: u8 = 100;

pub const ISSUE_TRACKER_URL: &str = "https://github.com/nbw/opz/issues";
