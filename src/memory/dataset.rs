use std::sync::Arc;

use tracing::{debug, warn};

use crate::convert::DataConverterRegistry;
use crate::cursor::Cursor;
use crate::dataset::{DataSet, Record, ensure_geometry_property, visit_remaining};
use crate::error::{DataAccessError, Result};
use crate::geometry::{Envelope, merge_envelope};
use crate::item::{DataSetItem, validate_values};
use crate::types::{AccessPolicy, ColumnSpec, DataSetSchema, TraverseType};
use crate::value::Value;

/// A random-access dataset kept entirely in memory.
///
/// Cloning is cheap: the clone shares the schema and the item storage with
/// the original until either side mutates, at which point the mutating side
/// copies. Use [`MemoryDataSet::deep_copy`] to detach storage eagerly.
#[derive(Clone, Debug)]
pub struct MemoryDataSet {
    schema: Arc<DataSetSchema>,
    items: Arc<Vec<Vec<Value>>>,
    cursor: Cursor,
}

impl MemoryDataSet {
    pub fn new(schema: DataSetSchema) -> Self {
        Self::with_schema(Arc::new(schema))
    }

    pub fn with_schema(schema: Arc<DataSetSchema>) -> Self {
        Self {
            schema,
            items: Arc::new(Vec::new()),
            cursor: Cursor::new(),
        }
    }

    /// Copies every remaining item of `src`, see [`MemoryDataSet::copy`].
    pub fn from_dataset(src: &mut dyn DataSet) -> Result<Self> {
        let mut dataset = Self::new(src.schema().clone());
        dataset.copy(src, 0)?;
        Ok(dataset)
    }

    /// Copies a subset of the properties of `src`, in the given order.
    pub fn from_dataset_with_limit(
        src: &mut dyn DataSet,
        properties: &[usize],
        limit: usize,
    ) -> Result<Self> {
        let mut dataset = Self::new(src.schema().select(properties)?);
        dataset.copy_properties(src, properties, limit)?;
        Ok(dataset)
    }

    /// A copy that shares nothing with `self`.
    pub fn deep_copy(&self) -> Self {
        Self {
            schema: Arc::new(DataSetSchema::clone(&self.schema)),
            items: Arc::new(Vec::clone(&self.items)),
            cursor: self.cursor,
        }
    }

    pub fn shares_storage_with(&self, other: &MemoryDataSet) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    pub fn schema_ref(&self) -> &Arc<DataSetSchema> {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        Arc::make_mut(&mut self.items).clear();
        self.cursor.move_before_first();
    }

    /// Appends the item under the cursor of `src` and every item after it.
    ///
    /// With a non-zero `limit` at most `limit` items are copied, and running
    /// out of source items first is a [`DataAccessError::CopyLimitNotReached`]
    /// error. Items copied before the error stay in the dataset.
    pub fn copy(&mut self, src: &mut dyn DataSet, limit: usize) -> Result<usize> {
        let properties: Vec<usize> = (0..src.num_properties()).collect();
        self.copy_properties(src, &properties, limit)
    }

    /// Like [`MemoryDataSet::copy`], taking only the listed source properties.
    pub fn copy_properties(
        &mut self,
        src: &mut dyn DataSet,
        properties: &[usize],
        limit: usize,
    ) -> Result<usize> {
        if properties.len() != self.schema.len() {
            return Err(DataAccessError::InvalidPropertyCount {
                expected: self.schema.len(),
                got: properties.len(),
            });
        }

        let schema = Arc::clone(&self.schema);
        let items = Arc::make_mut(&mut self.items);
        if limit > 0 {
            items.reserve(limit);
        }

        let copied = visit_remaining(src, limit, |src| {
            let values = properties
                .iter()
                .map(|&p| src.value(p))
                .collect::<Result<Vec<_>>>()?;
            validate_values(&schema, &values)?;
            items.push(values);
            Ok(())
        })?;

        debug!(dataset = schema.name(), copied, "copied items");
        if limit > 0 && copied < limit {
            warn!(
                dataset = schema.name(),
                requested = limit,
                copied,
                "source dataset ran out before the copy limit"
            );
            return Err(DataAccessError::CopyLimitNotReached {
                requested: limit,
                copied,
            });
        }
        Ok(copied)
    }

    /// Appends an item. Its values must match this dataset's schema.
    pub fn add(&mut self, item: DataSetItem) -> Result<()> {
        self.add_values(item.into_values())
    }

    pub fn add_values(&mut self, values: Vec<Value>) -> Result<()> {
        validate_values(&self.schema, &values)?;
        Arc::make_mut(&mut self.items).push(values);
        Ok(())
    }

    /// Removes the item under the cursor and returns it.
    ///
    /// The cursor then points at the item that followed, or after the last item.
    pub fn remove_current(&mut self) -> Result<DataSetItem> {
        let i = self
            .cursor
            .current()
            .ok_or(DataAccessError::InvalidCursorPosition)?;
        let values = Arc::make_mut(&mut self.items).remove(i);
        self.cursor.clamp(self.items.len());
        Ok(DataSetItem::from_values(Arc::clone(&self.schema), values)?)
    }

    /// Adds a property, filling existing items with `default`.
    pub fn add_property(&mut self, spec: ColumnSpec, default: Value) -> Result<()> {
        default.check_type(spec.data_type)?;
        Arc::make_mut(&mut self.schema).push(spec)?;
        for values in Arc::make_mut(&mut self.items).iter_mut() {
            values.push(default.clone());
        }
        Ok(())
    }

    pub fn drop_property(&mut self, pos: usize) -> Result<ColumnSpec> {
        let removed = Arc::make_mut(&mut self.schema).remove(pos)?;
        for values in Arc::make_mut(&mut self.items).iter_mut() {
            values.remove(pos);
        }
        Ok(removed)
    }

    /// Replaces the description of property `pos`, converting every stored
    /// value to the new type. Nothing changes if any value fails to convert.
    pub fn update_property(
        &mut self,
        pos: usize,
        spec: ColumnSpec,
        registry: &DataConverterRegistry,
    ) -> Result<()> {
        let current = self.schema.column(pos)?.data_type;
        let converted = if current == spec.data_type {
            None
        } else {
            let values = self
                .items
                .iter()
                .map(|values| registry.convert(&values[pos], spec.data_type))
                .collect::<Result<Vec<_>>>()?;
            Some(values)
        };

        Arc::make_mut(&mut self.schema).replace(pos, spec)?;
        if let Some(converted) = converted {
            for (values, value) in Arc::make_mut(&mut self.items).iter_mut().zip(converted) {
                values[pos] = value;
            }
        }
        Ok(())
    }

    pub fn set_property_name(&mut self, pos: usize, name: impl Into<String>) -> Result<()> {
        let mut spec = self.schema.column(pos)?.clone();
        spec.name = name.into();
        Arc::make_mut(&mut self.schema).replace(pos, spec)
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        Arc::make_mut(&mut self.schema).set_name(name);
    }

    /// The item under the cursor. It shares this dataset's schema.
    pub fn item(&self) -> Result<DataSetItem> {
        let i = self
            .cursor
            .current()
            .ok_or(DataAccessError::InvalidCursorPosition)?;
        self.item_at(i)
    }

    pub fn item_at(&self, i: usize) -> Result<DataSetItem> {
        let values = self
            .items
            .get(i)
            .ok_or(DataAccessError::ItemIndexOutOfRange {
                index: i,
                size: self.items.len(),
            })?;
        DataSetItem::from_values(Arc::clone(&self.schema), values.clone())
    }

    pub fn items(&self) -> impl Iterator<Item = DataSetItem> + '_ {
        self.items
            .iter()
            .map(|values| DataSetItem::from_values(Arc::clone(&self.schema), values.clone()))
            .filter_map(Result::ok)
    }

    fn current_values(&self) -> Result<&[Value]> {
        let i = self
            .cursor
            .current()
            .ok_or(DataAccessError::InvalidCursorPosition)?;
        Ok(&self.items[i])
    }
}

impl Record for MemoryDataSet {
    fn schema(&self) -> &DataSetSchema {
        &self.schema
    }

    fn value(&self, i: usize) -> Result<Value> {
        self.schema.column(i)?;
        Ok(self.current_values()?[i].clone())
    }

    fn set_value(&mut self, i: usize, value: Value) -> Result<()> {
        value.check_type(self.schema.column(i)?.data_type)?;
        let row = self
            .cursor
            .current()
            .ok_or(DataAccessError::InvalidCursorPosition)?;
        Arc::make_mut(&mut self.items)[row][i] = value;
        Ok(())
    }
}

impl DataSet for MemoryDataSet {
    fn traverse_type(&self) -> TraverseType {
        TraverseType::Random
    }

    fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::ReadWrite
    }

    fn size(&self) -> Option<usize> {
        Some(self.items.len())
    }

    /// Computed from the stored items; the cursor does not move.
    fn extent(&mut self, i: usize) -> Result<Option<Envelope>> {
        ensure_geometry_property(&self.schema, i)?;
        let mut envelope = None;
        for values in self.items.iter() {
            if let Value::Geometry(geom) = &values[i]
                && let Some(e) = geom.envelope()?
            {
                merge_envelope(&mut envelope, e);
            }
        }
        Ok(envelope)
    }

    fn move_next(&mut self) -> bool {
        self.cursor.move_next(self.items.len())
    }

    fn move_previous(&mut self) -> bool {
        self.cursor.move_previous(self.items.len())
    }

    fn move_before_first(&mut self) -> bool {
        self.cursor.move_before_first()
    }

    fn move_first(&mut self) -> bool {
        self.cursor.move_first(self.items.len())
    }

    fn move_last(&mut self) -> bool {
        self.cursor.move_last(self.items.len())
    }

    fn move_to(&mut self, i: usize) -> bool {
        self.cursor.move_to(i, self.items.len())
    }

    fn is_at_begin(&self) -> bool {
        self.cursor.is_at_begin()
    }

    fn is_before_begin(&self) -> bool {
        self.cursor.is_before_begin()
    }

    fn is_at_end(&self) -> bool {
        self.cursor.is_at_end(self.items.len())
    }

    fn is_after_end(&self) -> bool {
        self.cursor.is_after_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RecordExt;
    use crate::geometry::Geometry;
    use crate::types::DataType;

    fn schema() -> DataSetSchema {
        DataSetSchema::new(
            "points",
            vec![
                ColumnSpec::new("id", DataType::Int32),
                ColumnSpec::new("label", DataType::String),
                ColumnSpec::new("geom", DataType::Geometry),
            ],
        )
    }

    fn sample(n: i32) -> Result<MemoryDataSet> {
        let mut ds = MemoryDataSet::new(schema());
        for i in 0..n {
            ds.add_values(vec![
                Value::Int32(i),
                Value::from(format!("p{i}")),
                Value::from(Geometry::point(i as f64, -(i as f64), Some(4326))?),
            ])?;
        }
        Ok(ds)
    }

    fn ids(ds: &mut dyn DataSet) -> Result<Vec<i32>> {
        let mut ids = Vec::new();
        ds.move_before_first();
        while ds.move_next() {
            ids.push(ds.get_int32("id")?);
        }
        Ok(ids)
    }

    #[test]
    fn cursor_traversal_and_typed_access() -> Result<()> {
        let mut ds = sample(3)?;
        assert!(ds.is_before_begin());
        assert!(matches!(
            ds.get_int32(0),
            Err(DataAccessError::InvalidCursorPosition)
        ));

        assert_eq!(ids(&mut ds)?, vec![0, 1, 2]);
        assert!(ds.is_after_end());

        assert!(ds.move_to(1));
        assert_eq!(ds.get_string("label")?, "p1");
        assert!(ds.move_previous());
        assert!(ds.is_at_begin());
        assert!(ds.move_last());
        assert!(ds.is_at_end());
        assert_eq!(ds.get_geometry("geom")?.point_xy()?, Some((2.0, -2.0)));
        assert_eq!(ds.size(), Some(3));
        assert!(!ds.is_connected());
        assert_eq!(ds.dataset_name_of_property(0)?, "points");
        Ok(())
    }

    #[test]
    fn setters_write_through_the_cursor() -> Result<()> {
        let mut ds = sample(2)?;
        ds.move_first();
        ds.set_string("label", "renamed".to_string())?;
        ds.set_null(2)?;
        assert!(ds.is_null_at("geom")?);

        let err = ds.set_int64("id", 5).expect_err("wrong type");
        assert!(matches!(err, DataAccessError::ValueTypeMismatch { .. }));

        ds.move_next();
        assert_eq!(ds.get_string("label")?, "p1");
        ds.move_first();
        assert_eq!(ds.get_string("label")?, "renamed");
        Ok(())
    }

    #[test]
    fn copy_with_limit_does_not_skip_rows() -> Result<()> {
        let mut src = sample(5)?;
        let mut first = MemoryDataSet::new(schema());
        let mut second = MemoryDataSet::new(schema());

        assert_eq!(first.copy(&mut src, 2)?, 2);
        assert_eq!(second.copy(&mut src, 3)?, 3);

        assert_eq!(ids(&mut first)?, vec![0, 1]);
        assert_eq!(ids(&mut second)?, vec![2, 3, 4]);
        Ok(())
    }

    #[test]
    fn copy_limit_not_reached_keeps_copied_items() -> Result<()> {
        let mut src = sample(2)?;
        let mut dst = MemoryDataSet::new(schema());
        let err = dst.copy(&mut src, 3).expect_err("only two items");
        assert!(matches!(
            err,
            DataAccessError::CopyLimitNotReached {
                requested: 3,
                copied: 2
            }
        ));
        assert_eq!(dst.len(), 2);
        Ok(())
    }

    #[test]
    fn copy_starts_at_the_current_item() -> Result<()> {
        let mut src = sample(4)?;
        src.move_to(2);
        let mut ds = MemoryDataSet::from_dataset(&mut src)?;
        assert_eq!(ids(&mut ds)?, vec![2, 3]);
        assert!(src.is_after_end());

        let mut empty = MemoryDataSet::from_dataset(&mut src)?;
        assert_eq!(empty.size(), Some(0));
        assert!(empty.is_empty());
        assert!(!empty.move_first());
        Ok(())
    }

    #[test]
    fn copy_property_subset() -> Result<()> {
        let mut src = sample(3)?;
        let mut ds = MemoryDataSet::from_dataset_with_limit(&mut src, &[1, 0], 0)?;
        assert_eq!(ds.num_properties(), 2);
        assert_eq!(ds.property_name(0)?, "label");
        ds.move_last();
        assert_eq!(ds.get_int32(1)?, 2);
        Ok(())
    }

    #[test]
    fn clones_share_storage_until_written() -> Result<()> {
        let original = sample(2)?;
        let mut shallow = original.clone();
        assert!(shallow.shares_storage_with(&original));

        shallow.move_first();
        shallow.set_int32("id", 100)?;
        assert!(!shallow.shares_storage_with(&original));

        let mut original = original;
        original.move_first();
        assert_eq!(original.get_int32("id")?, 0);

        let deep = original.deep_copy();
        assert!(!deep.shares_storage_with(&original));
        assert_eq!(deep.len(), original.len());
        Ok(())
    }

    #[test]
    fn remove_current_moves_to_following_item() -> Result<()> {
        let mut ds = sample(3)?;
        ds.move_to(1);
        let removed = ds.remove_current()?;
        assert_eq!(removed.get_int32("id")?, 1);
        assert_eq!(ds.get_int32("id")?, 2);

        ds.remove_current()?;
        assert!(ds.is_after_end());
        assert!(matches!(
            ds.remove_current(),
            Err(DataAccessError::InvalidCursorPosition)
        ));
        assert_eq!(ids(&mut ds)?, vec![0]);
        Ok(())
    }

    #[test]
    fn property_maintenance() -> Result<()> {
        let mut ds = sample(2)?;
        let item_before = ds.item_at(0)?;

        ds.add_property(ColumnSpec::new("score", DataType::Int16), Value::Int16(7))?;
        ds.move_last();
        assert_eq!(ds.get_int16("score")?, 7);
        assert!(!item_before.shares_schema_with(ds.schema_ref()));

        let registry = DataConverterRegistry::with_defaults();
        ds.update_property(3, ColumnSpec::new("score", DataType::String), &registry)?;
        assert_eq!(ds.get_string("score")?, "7");

        ds.set_property_name(1, "name")?;
        assert_eq!(ds.property_position("name"), Some(1));
        assert_eq!(ds.property_position("label"), None);

        let dropped = ds.drop_property(0)?;
        assert_eq!(dropped.name, "id");
        assert_eq!(ds.get_string("name")?, "p1");
        assert!(matches!(
            ds.add_property(ColumnSpec::new("name", DataType::String), Value::Null),
            Err(DataAccessError::DuplicateProperty { .. })
        ));
        Ok(())
    }

    #[test]
    fn failed_update_leaves_dataset_untouched() -> Result<()> {
        let mut ds = sample(2)?;
        let registry = DataConverterRegistry::with_defaults();
        let err = ds
            .update_property(1, ColumnSpec::new("label", DataType::Int32), &registry)
            .expect_err("labels are not numbers");
        assert!(matches!(err, DataAccessError::ValueParse { .. }));
        assert_eq!(ds.property_data_type(1)?, DataType::String);
        Ok(())
    }

    #[test]
    fn items_share_the_schema() -> Result<()> {
        let mut ds = sample(2)?;
        ds.move_first();
        let item = ds.item()?;
        assert!(item.shares_schema_with(ds.schema_ref()));
        assert_eq!(item.get_string("label")?, "p0");
        assert_eq!(ds.items().count(), 2);

        let mut other = MemoryDataSet::new(schema());
        other.add(item)?;
        assert_eq!(other.len(), 1);
        Ok(())
    }

    #[test]
    fn extent_unions_geometries_without_moving() -> Result<()> {
        let mut ds = sample(3)?;
        ds.move_to(1);
        assert_eq!(ds.extent(2)?, Some(Envelope::new(0.0, -2.0, 2.0, 0.0)));
        assert_eq!(ds.get_int32("id")?, 1);
        assert!(matches!(
            ds.extent(0),
            Err(DataAccessError::ValueTypeMismatch { .. })
        ));
        Ok(())
    }
}
