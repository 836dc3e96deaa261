//! Collision detection over bucketed objects.

use std::collections::BTreeMap;

use super::build::{Bucket, ObjectBuckets};
use crate::core::{Collision, CollisionError, CollisionKey, ObjectKind};

fn scan_kind<K>(kind: ObjectKind, buckets: &BTreeMap<K, Bucket>, to_key: fn(&K) -> CollisionKey, out: &mut Vec<Collision>) {
	for (key, bucket) in buckets {
		if !bucket.is_conflicting() {
			continue;
		}
		out.push(Collision {
			kind,
			key: to_key(key),
			identities: bucket.identities(),
			bindings: bucket.sites().into_iter().map(ToString::to_string).collect(),
		});
	}
}

/// Every conflicting bucket, asset kind first, then schedules, sensors and jobs, each
/// in key order.
///
/// Check buckets are not inspected: several checks may share an asset and name.
pub fn collisions(buckets: &ObjectBuckets) -> Vec<Collision> {
	let mut out = Vec::new();
	let name = |name: &String| CollisionKey::Name(name.clone());
	scan_kind(ObjectKind::Asset, &buckets.assets, |key| CollisionKey::Asset(key.clone()), &mut out);
	scan_kind(ObjectKind::Schedule, &buckets.schedules, name, &mut out);
	scan_kind(ObjectKind::Sensor, &buckets.sensors, name, &mut out);
	scan_kind(ObjectKind::Job, &buckets.jobs, name, &mut out);
	out
}

/// Fails with the first collision found by [`collisions`], carrying the rest.
pub fn validate(buckets: &ObjectBuckets) -> Result<(), CollisionError> {
	let mut found = collisions(buckets).into_iter();
	match found.next() {
		None => Ok(()),
		Some(first) => {
			tracing::debug!(kind = %first.kind, key = %first.key, "conflicting definitions");
			Err(CollisionError {
				first,
				others: found.collect(),
			})
		}
	}
}
