use tonic::metadata::{Ascii, KeyAndValueRef, MetadataKey, MetadataMap, MetadataValue};
use tracing::debug;

pub fn log_metadata(metadata: &MetadataMap) {
    metadata_for_each(metadata, |key, value| debug!("metadata {}: {:?}", key.as_str(), value));
}

/// Copy the `x-` prefixed entries of `md_from` into `md_into`.
pub fn merge_metadata(md_into: &mut MetadataMap, md_from: &MetadataMap) {
    metadata_for_each(md_from, |key, value| {
        if key.as_str().starts_with("x-") {
            md_into.insert(key.clone(), value.clone());
        }
    })
}

// binary entries are skipped
fn metadata_for_each<F>(metadata: &MetadataMap, mut f: F)
where
    F: FnMut(&MetadataKey<Ascii>, &MetadataValue<Ascii>),
{
    for key_and_value in metadata.iter() {
        if let KeyAndValueRef::Ascii(key, value) = key_and_value {
            f(key, value)
        }
    }
}
