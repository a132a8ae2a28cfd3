pub mod build_name_map;
pub mod locate_project_root;
pub mod release_tagging;
pub mod rewrite_manifest;
pub mod update_release_tags;
