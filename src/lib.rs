//! # release-tagger
//!
//! `release-tagger` tags every repository of a `repo`-managed source tree for
//! a release and writes a manifest that pins each project to its new tag.
//!
//! Given a previous release label (`v600`) and a new one (`v700`) a run:
//!
//! 1. finds the tree root, the first parent directory holding `.repo`;
//! 2. optionally runs `repo sync` there;
//! 3. maps every project to its tag name by replacing the previous label
//!    with the new one inside the project's `upstream` attribute;
//! 4. fetches each repository and creates and pushes the tag when missing,
//!    falling back to the current repository for checkouts that are absent;
//! 5. writes `.repo/manifests/<release>_manifest.xml` with every mapped
//!    project's `revision` set to its tag.
//!
//! Runs are dry by default; nothing is created or pushed without `--apply`.
//!
//! ```bash
//! release-tagger -p v600 -r v700            # report what would happen
//! release-tagger -p v600 -r v700 --apply    # create and push the tags
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: manifest document, name map, release labels, project tree
//! - [`application`]: the tagging pipeline and its status reporting seam
//! - [`infrastructure`]: libgit2 tag operations, manifest files, external commands
//! - [`presentation`]: CLI and console output
//! - [`common`]: error type and result helpers
//!
//! ## Using the library
//!
//! ```rust,no_run
//! use release_tagger::application::reporting::StatusLine;
//! use release_tagger::application::use_cases::release_tagging::{
//!     ReleaseTaggingConfig, ReleaseTaggingUseCase,
//! };
//! use release_tagger::domain::value_objects::release_labels::ReleaseLabels;
//!
//! # async fn example() -> release_tagger::Result<()> {
//! let labels = ReleaseLabels::from_cli("v700", Some("v600"))?;
//! let config = ReleaseTaggingConfig::new(labels, "/src/aosp");
//!
//! let mut lines: Vec<StatusLine> = Vec::new();
//! let summary = ReleaseTaggingUseCase::new(config).execute(&mut lines).await?;
//!
//! println!("New manifest: {}", summary.manifest.output_path.display());
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::TaggerError;
pub use crate::common::result::TaggerResult as Result;
