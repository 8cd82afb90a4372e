pub mod panel;
pub mod preferences;

pub use panel::PanelPage;
pub use preferences::PreferencesPage;
