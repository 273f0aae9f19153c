//! Shared fixtures: a catalog over the in-memory store and a temp image dir.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shop_catalog::{
    Catalog, Category, CategoryForm, Color, ColorForm, Document, DocumentStore,
    InMemoryDocumentStore, InstanceForm, Item, ItemForm, ItemInstance, LocalFileStorage,
    StoreError, Upload, Versioned,
};
use tempfile::TempDir;

pub struct Fixture<S = InMemoryDocumentStore> {
    pub catalog: Catalog<S, LocalFileStorage>,
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_store(InMemoryDocumentStore::new())
    }
}

impl Fixture<FlakyStore> {
    pub fn flaky() -> Self {
        Self::with_store(FlakyStore::new())
    }

    pub fn store(&self) -> &FlakyStore {
        self.catalog.store()
    }
}

impl<S: DocumentStore> Fixture<S> {
    pub fn with_store(store: S) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(store, LocalFileStorage::new(), dir.path());
        Self { catalog, dir }
    }

    pub fn image_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Write a fake upload the way the HTTP intake does: random name, no extension.
    pub fn upload(&self, temporary_name: &str, original: &str) -> Upload {
        let path = self.dir.path().join(temporary_name);
        std::fs::write(&path, b"image bytes").unwrap();
        Upload::new(path, original)
    }

    /// Names of every file in the image directory, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn category(&self, title: &str) -> Category {
        self.catalog
            .create_category(CategoryForm {
                title: title.into(),
                description: format!("All the {}", title),
            })
            .unwrap()
    }

    pub fn color(&self, title: &str) -> Color {
        self.catalog
            .create_color(ColorForm { title: title.into() })
            .unwrap()
    }

    pub fn item(&self, title: &str, category: &Category) -> Item {
        self.catalog
            .create_item(item_form(title, &category.id), None)
            .unwrap()
            .item
    }

    pub fn instance(&self, item: &Item, color: &Color, status: &str) -> ItemInstance {
        self.catalog
            .create_instance(InstanceForm {
                item: item.id.clone(),
                color: color.id.clone(),
                status: status.into(),
            })
            .unwrap()
    }
}

pub fn item_form(title: &str, category: &str) -> ItemForm {
    ItemForm {
        title: title.into(),
        description: "A soft knitted toy".into(),
        price: "25".into(),
        category: category.into(),
    }
}

type Hook = Box<dyn FnOnce(&InMemoryDocumentStore) + Send>;

/// An in-memory store that can run code around the next guarded delete and
/// fail writes to one collection.
pub struct FlakyStore {
    pub inner: InMemoryDocumentStore,
    before_delete: Mutex<Option<Hook>>,
    after_delete: Mutex<Option<Hook>>,
    failing: Mutex<Option<&'static str>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            before_delete: Mutex::new(None),
            after_delete: Mutex::new(None),
            failing: Mutex::new(None),
        }
    }

    /// Run `hook` right before the next `delete_unreferenced` reaches the store.
    pub fn before_next_delete(&self, hook: impl FnOnce(&InMemoryDocumentStore) + Send + 'static) {
        *self.before_delete.lock().unwrap() = Some(Box::new(hook));
    }

    /// Run `hook` right after the next `delete_unreferenced` returns.
    pub fn after_next_delete(&self, hook: impl FnOnce(&InMemoryDocumentStore) + Send + 'static) {
        *self.after_delete.lock().unwrap() = Some(Box::new(hook));
    }

    /// Fail every insert, update and delete on `collection`.
    pub fn fail_writes_to(&self, collection: &'static str) {
        *self.failing.lock().unwrap() = Some(collection);
    }

    fn check<D: Document>(&self) -> Result<(), StoreError> {
        match *self.failing.lock().unwrap() {
            Some(collection) if collection == D::COLLECTION => {
                Err(StoreError::Storage(format!("{} is unavailable", collection)))
            }
            _ => Ok(()),
        }
    }
}

impl DocumentStore for FlakyStore {
    fn get<D: Document>(&self, id: &str) -> Result<Option<Versioned<D>>, StoreError> {
        self.inner.get(id)
    }

    fn find<D: Document>(
        &self,
        predicate: &dyn Fn(&D) -> bool,
    ) -> Result<Vec<Versioned<D>>, StoreError> {
        self.inner.find(predicate)
    }

    fn insert<D: Document>(&self, doc: &D) -> Result<Versioned<D>, StoreError> {
        self.check::<D>()?;
        self.inner.insert(doc)
    }

    fn update<D: Document>(
        &self,
        doc: &D,
        expected_version: u64,
    ) -> Result<Versioned<D>, StoreError> {
        self.check::<D>()?;
        self.inner.update(doc, expected_version)
    }

    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError> {
        self.check::<D>()?;
        self.inner.delete::<D>(id)
    }

    fn delete_unreferenced<D: Document>(&self, id: &str) -> Result<bool, StoreError> {
        self.check::<D>()?;
        if let Some(hook) = self.before_delete.lock().unwrap().take() {
            hook(&self.inner);
        }
        let result = self.inner.delete_unreferenced::<D>(id);
        if let Some(hook) = self.after_delete.lock().unwrap().take() {
            hook(&self.inner);
        }
        result
    }
}
