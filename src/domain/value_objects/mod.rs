pub mod release_labels;
