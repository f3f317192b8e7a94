// Translation between AttributeSet and its peer representations
//
// Each peer carries its own validity mask with its own bit layout. Only bits
// that are valid on the source side are translated, and bits a peer does not
// recognize are ignored rather than rejected.
//
// - local:   storage backend attributes
// - setattr: set-attributes requests, with the set-group-ID policy
// - md:      metadata-operation records, layered on setattr
// - inode:   cached local object metadata, with forward-only refresh
// - policy:  privilege check collaborator and the mode sanitizer

mod inode;
mod local;
mod md;
mod policy;
mod setattr;

pub use inode::{InodeAttrs, INODE_KINDS};
pub use local::{LocalAttrs, LocalValid};
pub use md::MdOpData;
pub use policy::{sanitize_mode, Principal, PrivilegeCheck, Privileged};
pub use setattr::{AttrValid, SetAttrRequest};
