pub mod error_dialog;
pub mod fuel_readout;
pub mod status_row;
pub mod toast;
