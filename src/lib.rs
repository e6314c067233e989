//! # flowport - Model-Generated Flow Import Pipeline
//!
//! **flowport** takes the free-form text a language model replies with, finds the JSON flow
//! it describes, and merges those nodes into a live flow-editor document without corrupting
//! what is already there. Model output is treated as untrusted: ids may collide, wires may
//! point nowhere, `tab` containers may sneak in and change rules may confuse a transform
//! kind with a payload type.
//!
//! ## Core Workflow
//!
//! 1.  **Parse**: [`parser`] extracts the first fenced JSON block and normalizes it into
//!     candidate records (bare array, `{ "nodes": [...] }` or a single node).
//! 2.  **Sanitize**: [`sanitizer::Sanitizer`] drops typeless and `tab` records, assigns and
//!     remaps ids, normalizes and prunes wires and assigns the active workspace.
//! 3.  **Validate**: [`validator::Validator`] flags suspect nodes and fills in missing inject
//!     payloads.
//! 4.  **Commit**: [`importer::Importer`] hands the batch to the [`host::FlowHost`] as one
//!     undoable action, or aborts with a single notification and no mutation.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowport::prelude::*;
//!
//! let mut host = MemoryHost::new().with_workspace("flow1");
//! let mut importer = Importer::builder().build();
//!
//! let reply = "Here you go:\n```json\n[{\"type\":\"inject\"}]\n```";
//! let outcome = importer.import_message(&mut host, reply);
//!
//! assert!(outcome.is_committed());
//! assert_eq!(host.nodes().len(), 1);
//! assert_eq!(host.nodes()[0].z.as_deref(), Some("flow1"));
//! ```
//!
//! Around the pipeline sit the pieces a chat sidebar needs: a [`chat::ConversationManager`],
//! a flat-file [`store::ChatStore`], the [`prompt`] builder and [`layout`] helpers.

pub mod chat;
pub mod error;
pub mod flow;
pub mod host;
pub mod importer;
pub mod layout;
pub mod parser;
pub mod prelude;
pub mod prompt;
pub mod sanitizer;
pub mod store;
pub mod validator;
