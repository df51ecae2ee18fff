//! Picture actions: the user's own collection and the shared public one.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info};

use super::listener::ListenerHandle;
use super::mutations::Mutation;
use super::types::{DbRecord, Pictures, PublicPictures};
use super::Store;
use crate::backend::{DbPath, Snapshot};
use crate::error::Result;

impl Store {
    /// Append `payload` to the current user's pictures. No-op without a
    /// payload or a signed-in user.
    pub async fn save_picture(&self, payload: Option<DbRecord>) -> Result<()> {
        let (Some(record), Some(user)) = (payload, self.current_user()) else {
            return Ok(());
        };

        let value = serde_json::to_value(&record)?;
        let key = self
            .call(self.backends().db.append(&DbPath::pictures(&user.uid), value))
            .await?;
        info!(uid = %user.uid, %key, "picture saved");
        Ok(())
    }

    /// Listen to the current user's pictures and commit every update.
    ///
    /// A null snapshot commits an empty collection. Failures are logged and
    /// absorbed: a failed subscribe returns `None`, an undecodable snapshot is
    /// skipped. Returns `None` without a signed-in user.
    pub async fn load_pictures(&self) -> Option<ListenerHandle> {
        let user = self.current_user()?;
        let path = DbPath::pictures(&user.uid);

        let subscription = match self.call(self.backends().db.subscribe(&path)).await {
            Ok(subscription) => subscription,
            Err(e) => {
                error!(%path, "failed to load pictures: {e}");
                return None;
            }
        };

        let committer = self.committer();
        Some(ListenerHandle::spawn(subscription, move |snapshot| {
            match decode_collection::<Pictures>(snapshot) {
                Ok(pictures) => {
                    info!(%path, count = pictures.len(), "pictures have been loaded");
                    committer.commit(Mutation::SetPictures(pictures));
                }
                Err(e) => error!(%path, "failed to decode pictures: {e}"),
            }
        }))
    }

    /// Listen to the shared public pictures and commit every update.
    ///
    /// # Errors
    /// Backend subscribe failures.
    pub async fn get_public_pictures(&self) -> Result<ListenerHandle> {
        let path = DbPath::public_pictures();
        let subscription = self.call(self.backends().db.subscribe(&path)).await?;

        let committer = self.committer();
        Ok(ListenerHandle::spawn(subscription, move |snapshot| {
            match decode_collection::<PublicPictures>(snapshot) {
                Ok(public) => committer.commit(Mutation::SetPublicPictures(public)),
                Err(e) => error!(%path, "failed to decode public pictures: {e}"),
            }
        }))
    }

    /// Append a picture URL to the shared collection. No-op without a payload.
    pub async fn add_public_picture(&self, payload: Option<String>) -> Result<()> {
        let Some(picture) = payload else {
            return Ok(());
        };

        self.call(
            self.backends()
                .db
                .append(&DbPath::public_pictures(), Value::String(picture)),
        )
        .await?;
        Ok(())
    }

    /// Overwrite the shared collection with the store's current copy.
    pub async fn update_public_pictures(&self) -> Result<()> {
        let value = serde_json::to_value(self.public_pictures())?;
        self.call(self.backends().db.write(&DbPath::public_pictures(), value))
            .await
    }
}

/// Null snapshots become an empty collection.
fn decode_collection<T>(snapshot: Snapshot) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match snapshot {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_snapshot_decodes_to_empty_collection() {
        let pictures: Pictures = decode_collection(None).expect("decode none");
        assert!(pictures.is_empty());

        let public: PublicPictures = decode_collection(Some(Value::Null)).expect("decode null");
        assert!(public.is_empty());
    }

    #[test]
    fn keyed_snapshot_decodes_to_records() {
        let snapshot = json!({
            "-M1": {"picture": "data:a", "createdAt": "2024-05-01T10:00:00Z"},
        });

        let pictures: Pictures = decode_collection(Some(snapshot)).expect("decode");
        assert_eq!(pictures["-M1"].picture, "data:a");
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let result = decode_collection::<Pictures>(Some(json!(["not", "a", "map"])));
        assert!(result.is_err());
    }
}
