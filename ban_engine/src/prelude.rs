//! Collects commonly-used names for convenient import

pub use crate::{
    address::*,
    ban::*,
    config::*,
    errors::*,
    id::*,
    notice::{
        resolve_admin_name,
        AdminName,
        DisplayNameCache,
        DisplayNameResolver,
        Localizer,
        MessageCatalog,
        NoticeFormatter,
        ResolutionError,
        UNKNOWN_ADMIN,
    },
};
