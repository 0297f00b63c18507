//! Reference resolution, run once the whole text has been scanned.

use log::debug;
use mdscan_core::{MarkKind, MarkList, ReferenceTable};

/// Fill in target and title of every by-reference link or image whose
/// label is defined. Definitions may appear after their uses.
pub(crate) fn resolve_references(marks: &mut MarkList, references: &ReferenceTable) {
    marks.update_each(|mark| match &mut mark.kind {
        MarkKind::LinkByReference {
            label,
            target,
            title,
            ..
        }
        | MarkKind::ImageByReference {
            label,
            target,
            title,
            ..
        } => match references.resolve(label) {
            Some(found) => {
                *target = Some(found.target.clone());
                *title = found.title.clone();
            }
            None => debug!("unresolved reference [{}] at {}", label, mark.start),
        },
        _ => {}
    });
}
