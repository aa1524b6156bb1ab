#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
        }
    }
}
