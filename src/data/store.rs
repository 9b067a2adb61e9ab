// ============================================================
// Layer 4 - Dataset Store
// ============================================================
// Reads the precomputed word-index and label columns of one
// dataset split from a single Apache Parquet file.
//
// File layout:
//   column  id     Utf8            sample id, unique
//   column  x_ids  List<Int64>     word ids of the document
//   column  y_ids  List<Int64>     raw label ids of the document
//
//   file metadata key "label_ids" (optional):
//     {"<label id>": "<word id>_<word id>_..."}
//   maps every raw label id to the vocabulary ids of its words.
//
// A null x_ids / y_ids entry means the sample has no such column;
// lookups for it fail and the vectorizer skips the sample.
//
// Reference: arrow / parquet crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{Array, ArrayRef, AsArray, ListArray, StringArray},
    datatypes::Int64Type,
    record_batch::RecordBatch,
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    file::properties::WriterProperties,
    format::KeyValue,
};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs::File,
    path::Path,
    sync::Arc,
};

use crate::domain::traits::SampleSource;

pub const ID_COLUMN:     &str = "id";
pub const X_COLUMN:      &str = "x_ids";
pub const Y_COLUMN:      &str = "y_ids";
pub const LABEL_IDS_KEY: &str = "label_ids";

/// Raw label id → readable id ("12_45": vocabulary ids of the label words).
pub type LabelMap = BTreeMap<u32, String>;

/// Token-id column, label-id column and label map of one store.
pub type StoreColumns = (HashMap<String, Vec<u32>>, HashMap<String, Vec<u32>>, LabelMap);

/// In-memory view of one dataset store.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    /// Sample ids in file order
    ids: Vec<String>,

    /// Sample id → word ids
    x_ids: HashMap<String, Vec<u32>>,

    /// Sample id → raw label ids
    y_ids: HashMap<String, Vec<u32>>,

    /// Empty when the file carries no label map
    label_ids: LabelMap,
}

impl DatasetStore {
    /// Build a store from in-memory columns.
    /// Sample order is the sorted union of both columns' ids.
    pub fn from_columns(
        x_ids:     HashMap<String, Vec<u32>>,
        y_ids:     HashMap<String, Vec<u32>>,
        label_ids: LabelMap,
    ) -> Self {
        let mut ids: Vec<String> = x_ids.keys().chain(y_ids.keys()).cloned().collect();
        ids.sort();
        ids.dedup();
        Self { ids, x_ids, y_ids, label_ids }
    }

    /// Open a Parquet store read-only.
    ///
    /// Fails if the file is missing, is not Parquet, lacks a required
    /// column, or holds null/duplicate ids or negative word/label ids.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path)
            .with_context(|| format!("Cannot open dataset store '{}'", path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .with_context(|| format!("'{}' is not a Parquet file", path.display()))?;

        // The label map lives in the file footer, read it before
        // the builder is consumed
        let label_ids = match builder
            .metadata()
            .file_metadata()
            .key_value_metadata()
            .and_then(|kvs| kvs.iter().find(|kv| kv.key == LABEL_IDS_KEY))
            .and_then(|kv| kv.value.as_deref())
        {
            Some(json) => parse_label_map(json)
                .with_context(|| format!("Malformed label map in '{}'", path.display()))?,
            None => LabelMap::new(),
        };

        let reader = builder
            .build()
            .with_context(|| format!("Cannot read '{}'", path.display()))?;

        let mut store = Self { label_ids, ..Self::default() };
        let mut seen  = HashSet::new();

        for batch in reader {
            let batch = batch
                .with_context(|| format!("Corrupt record batch in '{}'", path.display()))?;
            store.append_batch(&batch, &mut seen)
                .with_context(|| format!("Malformed dataset store '{}'", path.display()))?;
        }

        tracing::info!(
            "Opened dataset store '{}' ({} samples, {} labels)",
            path.display(),
            store.len(),
            store.label_ids.len()
        );
        Ok(store)
    }

    /// Write the store as a single-row-group Parquet file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let ids = StringArray::from(self.ids.clone());
        let x   = id_list_column(&self.ids, &self.x_ids);
        let y   = id_list_column(&self.ids, &self.y_ids);

        let batch = RecordBatch::try_from_iter(vec![
            (ID_COLUMN, Arc::new(ids) as ArrayRef),
            (X_COLUMN,  Arc::new(x)   as ArrayRef),
            (Y_COLUMN,  Arc::new(y)   as ArrayRef),
        ])?;

        let mut props = WriterProperties::builder();
        if !self.label_ids.is_empty() {
            let json = serde_json::to_string(&self.label_ids)?;
            props = props.set_key_value_metadata(Some(vec![KeyValue::new(
                LABEL_IDS_KEY.to_string(),
                json,
            )]));
        }

        let file = File::create(path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props.build()))?;
        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!("Wrote {} samples to '{}'", self.len(), path.display());
        Ok(())
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn x_ids(&self) -> &HashMap<String, Vec<u32>> {
        &self.x_ids
    }

    pub fn y_ids(&self) -> &HashMap<String, Vec<u32>> {
        &self.y_ids
    }

    pub fn label_map(&self) -> &LabelMap {
        &self.label_ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_columns(self) -> StoreColumns {
        (self.x_ids, self.y_ids, self.label_ids)
    }

    /// `seen` holds every id read so far, including rows with neither column.
    fn append_batch(&mut self, batch: &RecordBatch, seen: &mut HashSet<String>) -> Result<()> {
        let ids = batch
            .column_by_name(ID_COLUMN)
            .ok_or_else(|| anyhow!("missing column '{ID_COLUMN}'"))?
            .as_string_opt::<i32>()
            .ok_or_else(|| anyhow!("column '{ID_COLUMN}' is not Utf8"))?;
        let xs = list_column(batch, X_COLUMN)?;
        let ys = list_column(batch, Y_COLUMN)?;

        for row in 0..batch.num_rows() {
            if ids.is_null(row) {
                bail!("null sample id at row {row}");
            }
            let id = ids.value(row).to_string();
            if !seen.insert(id.clone()) {
                bail!("duplicate sample id '{id}'");
            }

            if let Some(x) = read_ids(xs, row).with_context(|| format!("sample '{id}'"))? {
                self.x_ids.insert(id.clone(), x);
            }
            if let Some(y) = read_ids(ys, row).with_context(|| format!("sample '{id}'"))? {
                self.y_ids.insert(id.clone(), y);
            }
            self.ids.push(id);
        }
        Ok(())
    }
}

impl SampleSource for DatasetStore {
    fn token_ids(&self, id: &str) -> Option<&[u32]> {
        self.x_ids.get(id).map(Vec::as_slice)
    }

    fn label_ids(&self, id: &str) -> Option<&[u32]> {
        self.y_ids.get(id).map(Vec::as_slice)
    }
}

/// Open a store and return its token-id column, label-id column and
/// label map (empty when the file has none).
pub fn load_data(path: impl AsRef<Path>) -> Result<StoreColumns> {
    Ok(DatasetStore::open(path)?.into_columns())
}

fn list_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ListArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("missing column '{name}'"))?
        .as_list_opt::<i32>()
        .ok_or_else(|| anyhow!("column '{name}' is not a List"))
}

/// Read one list entry as word/label ids. Null entries return None.
fn read_ids(list: &ListArray, row: usize) -> Result<Option<Vec<u32>>> {
    if list.is_null(row) {
        return Ok(None);
    }
    let values = list.value(row);
    let values = values
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| anyhow!("list values are not Int64"))?;

    let mut out = Vec::with_capacity(values.len());
    for v in values.iter() {
        let v = v.ok_or_else(|| anyhow!("null id inside list"))?;
        let v = u32::try_from(v).map_err(|_| anyhow!("id {v} out of range"))?;
        out.push(v);
    }
    Ok(Some(out))
}

fn id_list_column(ids: &[String], column: &HashMap<String, Vec<u32>>) -> ListArray {
    ListArray::from_iter_primitive::<Int64Type, _, _>(ids.iter().map(|id| {
        column
            .get(id)
            .map(|v| v.iter().map(|&x| Some(i64::from(x))).collect::<Vec<_>>())
    }))
}

fn parse_label_map(json: &str) -> Result<LabelMap> {
    let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|(k, v)| -> Result<(u32, String)> {
            let k = k
                .parse::<u32>()
                .with_context(|| format!("label id '{k}' is not an integer"))?;
            Ok((k, v))
        })
        .collect()
}
