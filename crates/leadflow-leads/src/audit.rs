//! Per-field change detection for lead updates.

use leadflow_core::models::lead::Lead;
use leadflow_core::models::modification::CreateLeadModification;

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Whether a field moved from `old` to `new`. Absent and blank values
/// are the same thing.
pub fn field_changed(old: Option<&str>, new: Option<&str>) -> bool {
    present(old) != present(new)
}

/// One modification entry per mutable field that differs between
/// `before` and `after`, in field order.
pub fn diff_leads(before: &Lead, after: &Lead, actor: &str) -> Vec<CreateLeadModification> {
    before
        .audit_fields()
        .into_iter()
        .zip(after.audit_fields())
        .filter(|((_, old), (_, new))| field_changed(old.as_deref(), new.as_deref()))
        .map(|((field, old), (_, new))| CreateLeadModification {
            lead_id: before.id,
            modified_field: field.to_string(),
            old_value: old,
            new_value: new,
            modified_by: actor.to_string(),
        })
        .collect()
}
