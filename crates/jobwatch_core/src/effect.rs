#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a session, tearing down any live one and cancelling any pending retry.
    Connect,
    /// Deliver a rendered CSV as a downloadable file.
    WriteExport { csv: String, rows: usize },
    PingBackend,
}
