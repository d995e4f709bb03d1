//! Card service.
//!
//! [`CardService`] is the handle request handlers share. It owns the [`CardStore`] behind a
//! lock and the [`UploadsService`] that validates and writes images, and sequences the two
//! so that:
//!
//! - an image is validated before anything is written or mutated
//! - an update for an unknown id never writes a file
//! - a file written for a card that could not be registered is removed again
//!
//! Files belonging to deleted cards, or replaced by a newer image, are left on disk.

use crate::card::{Card, CardDraft, CardId, CardPatch, CardUpdate, NewCard};
use crate::config::CoreConfig;
use crate::store::CardStore;
use crate::{CardError, CardResult};
use cards_files::{StoredImage, UploadsService};
use chrono::Utc;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug)]
pub struct CardService {
    store: Arc<RwLock<CardStore>>,
    uploads: Arc<UploadsService>,
}

impl CardService {
    /// Creates a service with an empty store, creating the uploads directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `CardError::Files` if the uploads directory cannot be created or used.
    pub fn new(cfg: &CoreConfig) -> CardResult<Self> {
        let uploads = UploadsService::new(cfg.uploads_dir(), cfg.max_upload_bytes())?;

        Ok(Self {
            store: Arc::new(RwLock::new(CardStore::new())),
            uploads: Arc::new(uploads),
        })
    }

    /// Canonical directory uploaded images are written to.
    pub fn uploads_dir(&self) -> &Path {
        self.uploads.directory()
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.uploads.max_bytes()
    }

    /// All cards, most recently created first.
    pub fn list(&self) -> CardResult<Vec<Card>> {
        let mut cards = self.read()?.list().to_vec();
        cards.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(cards)
    }

    pub fn get(&self, id: &str) -> CardResult<Card> {
        let id = parse_id(id)?;
        let store = self.read()?;
        store.get(&id).cloned()
    }

    /// Stores the image and registers a new card referencing it.
    ///
    /// # Errors
    ///
    /// - `CardError::MissingImage` if no image was supplied
    /// - `CardError::InvalidImage` / `CardError::ImageTooLarge` if the image is rejected
    /// - `CardError::Files` if the image cannot be written
    pub fn create(&self, new_card: NewCard) -> CardResult<Card> {
        let image = new_card.image.ok_or(CardError::MissingImage)?;
        let stored = self.uploads.store(&image)?;

        let draft = CardDraft {
            title: new_card.title.unwrap_or_default(),
            description: new_card.description.unwrap_or_default(),
            tags: new_card.tags.unwrap_or_default(),
            image_url: stored.url.clone(),
            created_at: Utc::now(),
        };

        let card = match self.write() {
            Ok(mut store) => store.insert(draft),
            Err(e) => {
                self.discard(&stored);
                return Err(e);
            }
        };

        tracing::info!("created card {} with image {}", card.id, card.image_url);
        Ok(card)
    }

    /// Merges the supplied fields into an existing card, replacing its image if one is given.
    ///
    /// # Errors
    ///
    /// - `CardError::InvalidImage` / `CardError::ImageTooLarge` if the new image is rejected
    /// - `CardError::NotFound` if no card has this id
    /// - `CardError::Files` if the new image cannot be written
    pub fn update(&self, id: &str, update: CardUpdate) -> CardResult<Card> {
        let id = parse_id(id)?;

        if let Some(image) = &update.image {
            self.uploads.validate(image)?;
        }

        if !self.read()?.contains(&id) {
            return Err(CardError::NotFound(id.to_string()));
        }

        let stored = update
            .image
            .as_ref()
            .map(|image| self.uploads.store(image))
            .transpose()?;

        let patch = CardPatch {
            title: update.title,
            description: update.description,
            tags: update.tags,
            image_url: stored.as_ref().map(|s| s.url.clone()),
        };

        self.apply_update(&id, patch, stored.as_ref())
    }

    /// Merges `patch` under the write lock. The card may have been deleted since `update`
    /// checked for it; on any failure the freshly stored image is removed.
    pub(crate) fn apply_update(
        &self,
        id: &CardId,
        patch: CardPatch,
        stored: Option<&StoredImage>,
    ) -> CardResult<Card> {
        let result = self.write().and_then(|mut store| store.replace(id, patch));
        match (&result, stored) {
            (Err(_), Some(stored)) => self.discard(stored),
            (Ok(card), _) => tracing::info!("updated card {}", card.id),
            _ => {}
        }

        result
    }

    pub fn delete(&self, id: &str) -> CardResult<()> {
        let id = parse_id(id)?;
        let removed = self.write()?.remove(&id)?;

        tracing::info!("deleted card {}", removed.id);
        Ok(())
    }

    fn read(&self) -> CardResult<RwLockReadGuard<'_, CardStore>> {
        self.store.read().map_err(|_| CardError::StorePoisoned)
    }

    fn write(&self) -> CardResult<RwLockWriteGuard<'_, CardStore>> {
        self.store.write().map_err(|_| CardError::StorePoisoned)
    }

    fn discard(&self, stored: &StoredImage) {
        if let Err(e) = self.uploads.remove(stored) {
            tracing::warn!("failed to remove orphaned upload {}: {}", stored.file_name, e);
        }
    }
}

fn parse_id(id: &str) -> CardResult<CardId> {
    CardId::parse(id).ok_or_else(|| CardError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cards_files::ImageUpload;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const LIMIT: u64 = 64;

    fn test_service(dir: &Path) -> CardService {
        let cfg = CoreConfig::new(dir.join("uploads"), LIMIT).expect("valid config");
        CardService::new(&cfg).expect("service should start")
    }

    fn image(name: &str) -> ImageUpload {
        ImageUpload::new(name, Some("image/png".into()), vec![0x89, b'P', b'N', b'G'])
    }

    fn titled(title: &str, image_name: &str) -> NewCard {
        NewCard {
            title: Some(title.into()),
            image: Some(image(image_name)),
            ..Default::default()
        }
    }

    fn poison_store(service: &CardService) {
        let store = Arc::clone(&service.store);
        let _ = std::thread::spawn(move || {
            let _guard = store.write().unwrap();
            panic!("writer crashed while holding the store");
        })
        .join();
        assert!(service.store.is_poisoned());
    }

    fn uploaded_files(service: &CardService) -> Vec<PathBuf> {
        fs::read_dir(service.uploads_dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    #[test]
    fn test_new_creates_uploads_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let service = test_service(temp_dir.path());

        assert!(service.uploads_dir().is_dir());
        assert_eq!(service.max_upload_bytes(), LIMIT);
    }

    #[test]
    fn test_create_then_get() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        let card = service.create(titled("A", "a.png")).unwrap();
        let fetched = service.get(&card.id.to_string()).unwrap();

        assert_eq!(fetched.title, "A");
        assert_eq!(fetched.description, "");
        assert_eq!(fetched.tags, "");
        assert!(fetched.image_url.starts_with("/uploads/"));
        assert!(fetched.image_url.ends_with("-a.png"));
        assert_eq!(fetched, card);
        assert_eq!(uploaded_files(&service).len(), 1);
    }

    #[test]
    fn test_create_without_image_fails_and_writes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        let result = service.create(NewCard {
            title: Some("A".into()),
            description: Some("d".into()),
            tags: Some("t".into()),
            image: None,
        });

        assert!(matches!(result, Err(CardError::MissingImage)));
        assert!(service.list().unwrap().is_empty());
        assert!(uploaded_files(&service).is_empty());
    }

    #[test]
    fn test_create_rejects_non_image_and_oversized() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        let exe = service.create(NewCard {
            image: Some(image("setup.exe")),
            ..Default::default()
        });
        let big = service.create(NewCard {
            image: Some(ImageUpload::new(
                "big.png",
                Some("image/png".into()),
                vec![0; LIMIT as usize + 1],
            )),
            ..Default::default()
        });

        assert!(matches!(exe, Err(CardError::InvalidImage)));
        assert!(matches!(big, Err(CardError::ImageTooLarge { .. })));
        assert!(service.list().unwrap().is_empty());
        assert!(uploaded_files(&service).is_empty());
    }

    #[test]
    fn test_ids_strictly_increase_across_deletes() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        let mut sequences = Vec::new();
        for i in 0..4 {
            let card = service.create(titled(&i.to_string(), "x.png")).unwrap();
            sequences.push(card.id.sequence());
            if i % 2 == 0 {
                service.delete(&card.id.to_string()).unwrap();
            }
        }

        assert_eq!(sequences, vec![1, 2, 3, 4]);
        assert_eq!(service.list().unwrap().len(), 2);
    }

    #[test]
    fn test_list_is_most_recent_first_and_excludes_deleted() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        let a = service.create(titled("a", "a.png")).unwrap();
        let b = service.create(titled("b", "b.png")).unwrap();
        let c = service.create(titled("c", "c.png")).unwrap();
        service.delete(&b.id.to_string()).unwrap();

        let listed: Vec<CardId> = service.list().unwrap().into_iter().map(|c| c.id).collect();

        assert_eq!(listed, vec![c.id, a.id]);
    }

    #[test]
    fn test_update_title_only_leaves_other_fields() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        let card = service
            .create(NewCard {
                title: Some("A".into()),
                description: Some("desc".into()),
                tags: Some("x,y".into()),
                image: Some(image("a.png")),
            })
            .unwrap();

        let updated = service
            .update(
                &card.id.to_string(),
                CardUpdate {
                    title: Some("B".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "B");
        assert_eq!(updated.description, "desc");
        assert_eq!(updated.tags, "x,y");
        assert_eq!(updated.image_url, card.image_url);
        assert_eq!(updated.created_at, card.created_at);
        assert_eq!(service.get(&card.id.to_string()).unwrap(), updated);
    }

    #[test]
    fn test_update_with_empty_string_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        let card = service.create(titled("A", "a.png")).unwrap();

        let updated = service
            .update(
                &card.id.to_string(),
                CardUpdate {
                    title: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "");
    }

    #[test]
    fn test_update_image_only_replaces_image_url() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        let card = service.create(titled("A", "a.png")).unwrap();

        let updated = service
            .update(
                &card.id.to_string(),
                CardUpdate {
                    image: Some(image("b.png")),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_ne!(updated.image_url, card.image_url);
        assert!(updated.image_url.ends_with("-b.png"));
        assert_eq!(updated.title, "A");
        // The previous image stays on disk.
        assert_eq!(uploaded_files(&service).len(), 2);
    }

    #[test]
    fn test_update_missing_card_writes_no_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        let result = service.update(
            "card_42",
            CardUpdate {
                image: Some(image("a.png")),
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(CardError::NotFound(id)) if id == "card_42"));
        assert!(uploaded_files(&service).is_empty());
    }

    #[test]
    fn test_update_rejects_invalid_image_without_mutation() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        let card = service.create(titled("A", "a.png")).unwrap();

        let result = service.update(
            &card.id.to_string(),
            CardUpdate {
                title: Some("B".into()),
                image: Some(ImageUpload::new("a.exe", Some("image/png".into()), vec![1])),
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(CardError::InvalidImage)));
        assert_eq!(service.get(&card.id.to_string()).unwrap().title, "A");
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        let card = service.create(titled("A", "a.png")).unwrap();
        let id = card.id.to_string();

        service.delete(&id).unwrap();

        assert!(matches!(service.get(&id), Err(CardError::NotFound(_))));
        assert!(matches!(service.delete(&id), Err(CardError::NotFound(_))));
        // Deleting a card does not remove its image.
        assert_eq!(uploaded_files(&service).len(), 1);
    }

    #[test]
    fn test_unparseable_id_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        assert!(matches!(service.get("nope"), Err(CardError::NotFound(id)) if id == "nope"));
        assert!(matches!(
            service.update("nope", CardUpdate::default()),
            Err(CardError::NotFound(_))
        ));
        assert!(matches!(service.delete("nope"), Err(CardError::NotFound(_))));
    }

    #[test]
    fn test_clones_share_the_same_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        let other = service.clone();

        let card = service.create(titled("A", "a.png")).unwrap();

        assert_eq!(other.get(&card.id.to_string()).unwrap(), card);
    }

    #[test]
    fn test_create_removes_image_when_card_cannot_be_registered() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        poison_store(&service);

        let result = service.create(titled("Cat", "cat.png"));

        assert!(matches!(result, Err(CardError::StorePoisoned)));
        assert!(uploaded_files(&service).is_empty());
    }

    #[test]
    fn test_update_of_card_deleted_meanwhile_removes_new_image() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let card = service.create(titled("Cat", "cat.png")).unwrap();
        let stored = service.uploads.store(&image("dog.png")).unwrap();
        assert!(stored.path.exists());

        service.delete(&card.id.to_string()).unwrap();
        let patch = CardPatch {
            image_url: Some(stored.url.clone()),
            ..Default::default()
        };
        let result = service.apply_update(&card.id, patch, Some(&stored));

        assert!(matches!(result, Err(CardError::NotFound(_))));
        assert!(!stored.path.exists());
        assert!(service.get(&card.id.to_string()).is_err());
    }
}
