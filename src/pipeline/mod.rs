//! Batch orchestration over directories of reference clips.
//!
//! # Flow
//!
//! ```text
//! list_wav_files(dir)
//!        │
//!        ▼
//! analyze_paths()          ← spawn_blocking per file, results in input order
//!        │
//!        ├─ write_report() → JSON { file name → QualityReport }
//!        │
//!        ▼
//! select_for_refinement()  ← thresholds, or top N when nothing passes
//!        │
//!        ▼
//! refine_selected()        → refined_top{i}_{stem}.wav
//!        │
//!        ▼
//! clone_batch()            → sample_{i:02}_{emotion}.wav
//! ```

pub mod batch;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use batch::{
    analyze_paths, clone_batch, list_wav_files, refine_file, refine_selected, refined_name,
    sample_name, write_report, RefineOutcome,
};
