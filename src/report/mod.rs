pub mod dump;
pub mod plot;
pub mod snr;

/// Output encoding for the console reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Json,
}
