//! Vrcurate: a curation engine for visual relationship annotations.
//!
//! Vrcurate applies planned, auditable corrections to a per-image store
//! of visual relationship (VR) annotations: hand-authored per-image edits
//! expressed in a small instruction language, and bulk dataset-wide
//! operators (class/predicate merges, global VR removal and transforms,
//! duplicate purging). Every edit is checked against the exact data state
//! the editor believed existed, never applied silently against drifted
//! data.
//!
//! # Modules
//!
//! - [`vr`]: VR record types (bounding boxes, typed category IDs)
//! - [`store`]: name registries and the image-keyed annotation store
//! - [`protocol`]: the instruction language parser and state-machine driver
//! - [`bulk`]: dataset-wide mutation operators
//! - [`error`]: error types for vrcurate operations

pub mod bulk;
pub mod error;
pub mod protocol;
pub mod store;
pub mod vr;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use error::CurateError;

use store::{
    read_annotations, read_registry, write_annotations, write_registry, AnnotationStore,
    ClassRegistry, PredicateRegistry,
};
use vr::{ClassId, PredicateId};

/// The vrcurate CLI application.
#[derive(Parser)]
#[command(name = "vrcurate")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Paths to the persisted data files a curation pass works on.
#[derive(Args)]
struct DataArgs {
    /// Path to the annotations JSON file (image name -> VR records).
    #[arg(long)]
    annotations: PathBuf,

    /// Path to the object class names JSON array.
    #[arg(long)]
    objects: PathBuf,

    /// Path to the predicate names JSON array.
    #[arg(long)]
    predicates: PathBuf,

    /// Write the customized annotations back to the annotations file.
    /// Without this flag the run is a dry run: everything is checked and
    /// counted, nothing is persisted.
    #[arg(long)]
    write: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Apply a per-image instruction file to the annotations.
    Apply {
        /// The instruction text file to execute.
        instructions: PathBuf,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Remove exact-duplicate VR records from every image.
    Dedup {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Delete image entries whose VR list has become empty.
    PruneEmpty {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Globally merge one object class into another.
    MergeClass {
        /// The object class to be absorbed.
        #[arg(long)]
        from: String,

        /// The surviving object class.
        #[arg(long)]
        to: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Globally merge one predicate into another.
    MergePredicate {
        /// The predicate to be absorbed.
        #[arg(long)]
        from: String,

        /// The surviving predicate.
        #[arg(long)]
        to: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Globally remove every VR matching a (subject, predicate, object) triple.
    RemoveVr {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        predicate: String,

        #[arg(long)]
        object: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Globally transform every VR matching one triple into another.
    TransformVr {
        /// The source triple, as subject,predicate,object.
        #[arg(long, value_delimiter = ',', num_args = 3)]
        from: Vec<String>,

        /// The target triple, as subject,predicate,object.
        #[arg(long, value_delimiter = ',', num_args = 3)]
        to: Vec<String>,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Switch one object class to another in an explicit list of images.
    SwitchClass {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Image names to rewrite; repeat the flag per image.
        #[arg(long = "image", required = true)]
        images: Vec<String>,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Extend or rename entries of a name registry.
    Extend {
        /// Path to the registry JSON array to modify.
        registry: PathBuf,

        /// Which registry the file holds ('objects' or 'predicates').
        #[arg(long, default_value = "objects")]
        kind: String,

        /// New names to append; repeat the flag per name.
        #[arg(long = "add")]
        additions: Vec<String>,

        /// In-place renames as old=new; repeat the flag per rename.
        #[arg(long = "rename")]
        renames: Vec<String>,

        /// Write the modified registry back to the file.
        #[arg(long)]
        write: bool,
    },
}

/// Run the vrcurate CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CurateError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Apply { instructions, data }) => {
            with_store(&data, |store, objects, predicates| {
                let report =
                    protocol::apply_instruction_file(&instructions, store, objects, predicates)?;
                print!("{}", report);
                Ok(())
            })
        }
        Some(Commands::Dedup { data }) => with_store(&data, |store, _, _| {
            let (images, records) = bulk::remove_duplicate_vrs(store)?;
            println!(
                "Removed {} duplicate record(s) across {} image(s)",
                records, images
            );
            Ok(())
        }),
        Some(Commands::PruneEmpty { data }) => with_store(&data, |store, _, _| {
            let removed = bulk::remove_empty_images(store);
            println!("Removed {} empty image entry(s)", removed);
            Ok(())
        }),
        Some(Commands::MergeClass { from, to, data }) => {
            with_store(&data, |store, objects, _| {
                let images = bulk::merge_object_classes(store, objects, &from, &to)?;
                println!("Merged '{}' into '{}' in {} image(s)", from, to, images);
                Ok(())
            })
        }
        Some(Commands::MergePredicate { from, to, data }) => {
            with_store(&data, |store, _, predicates| {
                let images = bulk::merge_predicates(store, predicates, &from, &to)?;
                println!("Merged '{}' into '{}' in {} image(s)", from, to, images);
                Ok(())
            })
        }
        Some(Commands::RemoveVr {
            subject,
            predicate,
            object,
            data,
        }) => with_store(&data, |store, objects, predicates| {
            let removed = bulk::remove_vr_globally(
                store,
                objects,
                predicates,
                (&subject, &predicate, &object),
            )?;
            println!(
                "Removed {} instance(s) of ('{}', '{}', '{}')",
                removed, subject, predicate, object
            );
            Ok(())
        }),
        Some(Commands::TransformVr { from, to, data }) => {
            with_store(&data, |store, objects, predicates| {
                let changed = bulk::transform_vr_globally(
                    store,
                    objects,
                    predicates,
                    (&from[0], &from[1], &from[2]),
                    (&to[0], &to[1], &to[2]),
                )?;
                println!("Transformed {} instance(s)", changed);
                Ok(())
            })
        }
        Some(Commands::SwitchClass {
            from,
            to,
            images,
            data,
        }) => with_store(&data, |store, objects, _| {
            let count =
                bulk::switch_object_classes_in_named_images(store, objects, &from, &to, &images)?;
            println!("Switched '{}' to '{}' in {} image(s)", from, to, count);
            Ok(())
        }),
        Some(Commands::Extend {
            registry,
            kind,
            additions,
            renames,
            write,
        }) => run_extend(&registry, &kind, &additions, &renames, write),
        None => {
            println!("vrcurate {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Curation engine for visual relationship annotations.");
            println!();
            println!("Run 'vrcurate --help' for usage information.");
            Ok(())
        }
    }
}

/// Loads the store and registries, runs one curation operation, and
/// persists the store only when the operation succeeded and `--write`
/// was given. A dry run is identical except for the final write.
fn with_store<F>(data: &DataArgs, operation: F) -> Result<(), CurateError>
where
    F: FnOnce(
        &mut AnnotationStore,
        &ClassRegistry,
        &PredicateRegistry,
    ) -> Result<(), CurateError>,
{
    let objects = read_registry::<ClassId>(&data.objects)?;
    let predicates = read_registry::<PredicateId>(&data.predicates)?;
    let mut store = read_annotations(&data.annotations)?;

    operation(&mut store, &objects, &predicates)?;

    if data.write {
        write_annotations(&data.annotations, &store)?;
        println!(
            "Customized annotations saved to {}",
            data.annotations.display()
        );
    } else {
        println!("Dry run: changes not saved (pass --write to persist)");
    }
    Ok(())
}

/// Execute the extend subcommand against one registry file.
fn run_extend(
    path: &PathBuf,
    kind: &str,
    additions: &[String],
    renames: &[String],
    write: bool,
) -> Result<(), CurateError> {
    fn apply_edits<Id: store::RegistryId>(
        registry: &mut store::Registry<Id>,
        additions: &[String],
        renames: &[String],
    ) -> Result<(), CurateError> {
        for rename in renames {
            let (from, to) = rename.split_once('=').ok_or_else(|| {
                CurateError::config(format!("rename must be of the form old=new: '{}'", rename))
            })?;
            registry.rename(from, to)?;
            println!("Renamed '{}' to '{}'", from, to);
        }
        for name in additions {
            let id = registry.append(name.clone())?;
            println!("Appended '{}' with ID {}", name, id.index());
        }
        Ok(())
    }

    match kind {
        "objects" => {
            let mut registry = read_registry::<ClassId>(path)?;
            apply_edits(&mut registry, additions, renames)?;
            if write {
                write_registry(path, &registry)?;
                println!("Registry saved to {}", path.display());
            } else {
                println!("Dry run: registry not saved (pass --write to persist)");
            }
            Ok(())
        }
        "predicates" => {
            let mut registry = read_registry::<PredicateId>(path)?;
            apply_edits(&mut registry, additions, renames)?;
            if write {
                write_registry(path, &registry)?;
                println!("Registry saved to {}", path.display());
            } else {
                println!("Dry run: registry not saved (pass --write to persist)");
            }
            Ok(())
        }
        other => Err(CurateError::config(format!(
            "unknown registry kind '{}' (expected 'objects' or 'predicates')",
            other
        ))),
    }
}
