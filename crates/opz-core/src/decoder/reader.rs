use super::layout;

pub struct MessageReader<'a> {
    message: &'a [u8],
}

impl<'a> MessageReader<'a> {
    pub fn new(message: &'a [u8]) -> Self {
        Self { message }
    }

    pub fn has_len(&self, needed: usize) -> bool {
        self.message.len() >= needed
    }

    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        self.message.get(offset).copied()
    }

    pub fn status(&self) -> Option<u8> {
        self.read_u8(layout::STATUS_OFFSET)
    }

    pub fn data1(&self) -> Option<u8> {
        self.read_u8(layout::DATA1_OFFSET)
    }

    pub fn data2(&self) -> Option<u8> {
        self.read_u8(layout::DATA2_OFFSET)
    }

    /// Status byte and first data byte, when both are present.
    pub fn status_and_data1(&self) -> Option<(u8, u8)> {
        Some((self.status()?, self.data1()?))
    }

    /// Both data bytes, when the message carries them.
    pub fn data_pair(&self) -> Option<(u8, u8)> {
        Some((self.data1()?, self.data2()?))
    }
}
