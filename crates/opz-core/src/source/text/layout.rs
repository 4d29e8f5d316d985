pub const COMMENT_PREFIX: char = '#';
pub const HEX_PREFIXES: [&str; 2] = ["0x", "0X"];
pub const HEX_RADIX: u32 = 16;
pub const DECIMAL_RADIX: u32 = 10;

pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}
