/// Multi-label text classification: one text, several independent binary labels
pub mod multi_label;
