pub const BUNDLED_JSON: &str = include_str!("../../data/opz.json");

pub const ACTION: &str = "action";
pub const CONTROL: &str = "control";
pub const DIAL: &str = "dial";
pub const NOTES: &str = "notes";
pub const TRACK: &str = "track";

pub const DIAL_COLOR: &str = "color";
pub const DIAL_PAGE: &str = "page";

pub const NAMES: &str = "dictionary";
pub const NAMES_TRACK: &str = "track";
pub const NAMES_COLOR: &str = "color";

pub const ACTION_KEYS: &str = "keys";
pub const ACTION_DIAL: &str = "dial";
pub const ACTION_PITCH_BEND: &str = "pitch bend";

pub const PATH_SEPARATOR: &str = ".";
