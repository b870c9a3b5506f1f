/// Options shared by every stage of an extraction run.
#[derive(Clone, Debug)]
pub struct ExtraConfig {
    /// Number of extraction worker threads.
    pub workers: usize,
    /// Check the catalog against the header checksum before parsing it.
    pub verify_checksum: bool,
}

impl Default for ExtraConfig {
    fn default() -> Self {
        ExtraConfig {
            workers: num_cpus::get().max(1),
            verify_checksum: false,
        }
    }
}
