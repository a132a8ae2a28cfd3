pub mod manifest;
pub mod name_map;
pub mod project_tree;
