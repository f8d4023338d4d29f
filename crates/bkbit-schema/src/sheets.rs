//! Build a LinkML schema from BICAN model spreadsheets
//!
//! Every sheet starts with a display header row followed by one or more
//! descriptor rows (first cell starting with `>`). The first descriptor row
//! names the LinkML element or metaslot each column fills; later descriptor
//! rows carry per-column settings such as `internal_separator: "|"`,
//! `inner_key: range` or, inline with the descriptor,
//! `exact_mappings: {curie_prefix: NIMP}`.

use crate::error::{Result, SchemaError};
use crate::linkml::{
    AnonymousSlotExpression, ClassDefinition, EnumDefinition, LocalName, PermissibleValue,
    SchemaDefinition, SlotDefinition,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Ranges that never need an id reference added
pub const SIMPLE_TYPES_NOSTR: [&str; 5] = ["integer", "float", "boolean", "date", "datetime"];

pub const FIXED_SHEETS_DIR: &str = "fixed_sheets";
pub const TEMPLATE_FILE: &str = "classes_base.yaml";
pub const DEFAULT_SCHEMA_NAME: &str = "TEMP";

const LINKML_TYPES_IMPORT: &str = "linkml:types";
const LINKML_PREFIX: &str = "linkml";
const LINKML_PREFIX_REFERENCE: &str = "https://w3id.org/linkml/";

/// A spreadsheet as raw rows of cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Read a `.tsv` (or comma separated `.csv`) sheet, dropping carriage returns
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
            Some("csv") => b',',
            _ => b'\t',
        };
        Self::parse(&path.display().to_string(), &content, delimiter)
    }

    pub fn from_tsv_str(name: &str, content: &str) -> Result<Self> {
        Self::parse(name, content, b'\t')
    }

    fn parse(name: &str, content: &str, delimiter: u8) -> Result<Self> {
        let content = content.replace('\r', "");
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Ok(Self {
            name: name.to_string(),
            rows,
        })
    }

    pub fn to_tsv_string(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_writer(Vec::new());
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| SchemaError::sheet(&self.name, e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| SchemaError::sheet(&self.name, e.to_string()))
    }

    pub fn write_tsv(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_tsv_string()?).map_err(|e| SchemaError::io(path, e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TsvFixOptions {
    /// Mark slots with class ranges as `inlined`
    pub inlined: bool,
    /// Allow inlined slots to reference objects by id (adds `|string`)
    pub ref_by_ind: bool,
}

impl Default for TsvFixOptions {
    fn default() -> Self {
        Self {
            inlined: true,
            ref_by_ind: true,
        }
    }
}

fn is_true(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case("true")
}

/// Repair a sheet exported from Google Sheets
///
/// Mapping cells get `%20` for spaces. Sheets with a range column gain
/// `any_of`, `exactly_one_of` and `inlined` columns right after it, and
/// multi-type ranges move into one of the two union columns.
pub fn fix_sheet(sheet: &Sheet, options: TsvFixOptions) -> Result<Sheet> {
    if sheet.rows.len() < 3 {
        return Err(SchemaError::sheet(
            &sheet.name,
            "expected three header rows before the data",
        ));
    }
    let mut rows = sheet.rows.clone();

    let mapping_columns: Vec<usize> = rows[1]
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.to_lowercase().contains("mapping"))
        .map(|(index, _)| index)
        .collect();
    for row in rows.iter_mut().skip(3) {
        for &index in &mapping_columns {
            row[index] = row[index].replace(' ', "%20");
        }
    }

    let mut range = None;
    let (mut multivalued, mut exactly_one, mut value_set) = (None, None, None);
    for index in 0..rows[0].len() {
        let header = rows[0][index].to_lowercase();
        let header = header.trim();
        if rows[1][index].to_lowercase().trim().contains("range") {
            range = Some(index);
        } else if header.contains("multivalued") {
            multivalued = Some(index);
        } else if header.contains("exactlyoneof") {
            exactly_one = Some(index);
        } else if header.contains("permissible") {
            value_set = Some(index);
        }
    }

    let Some(range) = range else {
        return Ok(Sheet {
            name: sheet.name.clone(),
            rows,
        });
    };

    let shift = |column: Option<usize>| column.map(|index| if index > range { index + 3 } else { index });
    let (multivalued, exactly_one, value_set) = (shift(multivalued), shift(exactly_one), shift(value_set));
    let (any_of, exactly_one_of, inlined) = (range + 1, range + 2, range + 3);

    let range_header = rows[0][range].clone();
    let inserted = [
        [format!("{}: any_of", range_header), "any_of".to_string(), "inner_key: range".to_string()],
        [
            format!("{}: exactly_one_of", range_header),
            "exactly_one_of".to_string(),
            "inner_key: range".to_string(),
        ],
        [
            "inlined".to_string(),
            if options.inlined { "inlined" } else { "ignore" }.to_string(),
            String::new(),
        ],
    ];
    for (row_index, row) in rows.iter_mut().enumerate() {
        for (offset, column) in inserted.iter().enumerate() {
            let cell = column.get(row_index).cloned().unwrap_or_default();
            row.insert(range + 1 + offset, cell);
        }
    }

    let cell_is_true = |row: &[String], column: Option<usize>| column.is_some_and(|index| is_true(&row[index]));
    for row in rows.iter_mut().skip(3) {
        let mut value = row[range].trim().to_string();
        if value.is_empty() {
            continue;
        }

        let keep = value.contains("string")
            || value.split('|').all(|el| SIMPLE_TYPES_NOSTR.contains(&el))
            || value_set.is_some_and(|index| !row[index].trim().is_empty());
        if !keep && options.inlined {
            row[inlined] = "True".to_string();
            if options.ref_by_ind {
                value.push_str("|string");
            }
        }

        if value.contains('|') {
            if cell_is_true(&row[..], multivalued) && cell_is_true(&row[..], exactly_one) {
                row[exactly_one_of] = value;
            } else {
                row[any_of] = value;
            }
            row[range] = String::new();
        } else {
            row[range] = value;
        }
    }

    Ok(Sheet {
        name: sheet.name.clone(),
        rows,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct ColumnSettings {
    #[serde(default)]
    curie_prefix: Option<String>,
    #[serde(default)]
    internal_separator: Option<String>,
    #[serde(default)]
    inner_key: Option<String>,
}

impl ColumnSettings {
    fn merge(&mut self, other: ColumnSettings) {
        if other.curie_prefix.is_some() {
            self.curie_prefix = other.curie_prefix;
        }
        if other.internal_separator.is_some() {
            self.internal_separator = other.internal_separator;
        }
        if other.inner_key.is_some() {
            self.inner_key = other.inner_key;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Descriptor {
    Schema,
    Class,
    Enum,
    Slot,
    Attribute,
    PermissibleValue,
    Prefix,
    PrefixReference,
    Ignore,
    Metaslot(String),
}

impl Descriptor {
    fn from_name(name: &str) -> Self {
        match name {
            "schema" => Descriptor::Schema,
            "class" => Descriptor::Class,
            "enum" => Descriptor::Enum,
            "slot" => Descriptor::Slot,
            "attribute" => Descriptor::Attribute,
            "permissible_value" => Descriptor::PermissibleValue,
            "prefix" => Descriptor::Prefix,
            "prefix_reference" => Descriptor::PrefixReference,
            "ignore" | "" => Descriptor::Ignore,
            "alias" => Descriptor::Metaslot("aliases".to_string()),
            "is_required" => Descriptor::Metaslot("required".to_string()),
            other => Descriptor::Metaslot(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
struct Column {
    index: usize,
    descriptor: Descriptor,
    settings: ColumnSettings,
}

fn strip_marker(cell: &str) -> &str {
    cell.trim().trim_start_matches('>').trim()
}

fn parse_settings(cell: &str) -> Result<ColumnSettings> {
    let text = strip_marker(cell);
    if text.is_empty() {
        return Ok(ColumnSettings::default());
    }
    serde_yaml::from_str(text).map_err(|_| SchemaError::InvalidDescriptor(cell.to_string()))
}

fn parse_descriptor(cell: &str) -> Result<(Descriptor, ColumnSettings)> {
    let text = strip_marker(cell);
    match text.split_once(':') {
        Some((name, _)) if text.contains('{') => {
            let parsed: BTreeMap<String, ColumnSettings> = serde_yaml::from_str(text)
                .map_err(|_| SchemaError::InvalidDescriptor(cell.to_string()))?;
            let settings = parsed.into_values().next().unwrap_or_default();
            Ok((Descriptor::from_name(name.trim()), settings))
        }
        _ => Ok((Descriptor::from_name(text), ColumnSettings::default())),
    }
}

const LIST_METASLOTS: [&str; 8] = [
    "mixins",
    "in_subset",
    "exact_mappings",
    "aliases",
    "imports",
    "slots",
    "any_of",
    "exactly_one_of",
];

impl Column {
    fn with_prefix(&self, value: &str) -> String {
        match &self.settings.curie_prefix {
            Some(prefix) if !value.contains(':') => format!("{}:{}", prefix, value),
            _ => value.to_string(),
        }
    }

    fn value(&self, cell: &str) -> String {
        self.with_prefix(cell.trim())
    }

    /// Cell split on the column separator (`|` for list metaslots)
    fn values(&self, name: &str, cell: &str) -> Vec<String> {
        let separator = self
            .settings
            .internal_separator
            .as_deref()
            .or_else(|| LIST_METASLOTS.contains(&name).then_some("|"));
        match separator {
            Some(separator) => cell
                .split(separator)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| self.with_prefix(value))
                .collect(),
            None => vec![self.value(cell)],
        }
    }

    fn bool_value(&self, sheet: &str, cell: &str) -> Result<bool> {
        match cell.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            other => Err(SchemaError::sheet(
                sheet,
                format!("'{}' is not a boolean (column {})", other, self.index + 1),
            )),
        }
    }
}

/// Column layout of one sheet
struct SheetLayout {
    columns: Vec<Column>,
    data_start: usize,
}

impl SheetLayout {
    fn from_sheet(sheet: &Sheet) -> Result<Self> {
        let descriptor_rows: Vec<&Vec<String>> = sheet
            .rows
            .iter()
            .skip(1)
            .take_while(|row| row.first().is_some_and(|cell| cell.trim().starts_with('>')))
            .collect();
        let Some((descriptors, settings_rows)) = descriptor_rows.split_first() else {
            return Err(SchemaError::sheet(
                &sheet.name,
                "missing the '>' column descriptor row",
            ));
        };

        let mut columns = Vec::new();
        for (index, cell) in descriptors.iter().enumerate() {
            let (descriptor, mut settings) = parse_descriptor(cell)?;
            for row in settings_rows {
                if let Some(cell) = row.get(index) {
                    settings.merge(parse_settings(cell)?);
                }
            }
            columns.push(Column {
                index,
                descriptor,
                settings,
            });
        }
        Ok(Self {
            columns,
            data_start: 1 + descriptor_rows.len(),
        })
    }

    fn main_value<'r>(&self, row: &'r [String], wanted: &[Descriptor]) -> Option<&'r str> {
        self.columns
            .iter()
            .filter(|column| wanted.contains(&column.descriptor))
            .filter_map(|column| row.get(column.index).map(|cell| cell.trim()))
            .find(|cell| !cell.is_empty())
    }

    fn has(&self, wanted: &[Descriptor]) -> bool {
        self.columns.iter().any(|column| wanted.contains(&column.descriptor))
    }
}

enum Target<'s> {
    Schema(&'s mut SchemaDefinition),
    Class(&'s mut ClassDefinition),
    Slot(&'s mut SlotDefinition),
    Enum(&'s mut EnumDefinition),
    Value(&'s mut PermissibleValue),
}

fn yaml(text: String) -> serde_yaml::Value {
    serde_yaml::Value::String(text)
}

impl Target<'_> {
    fn apply(&mut self, sheet: &str, name: &str, column: &Column, cell: &str) -> Result<()> {
        let text = column.value(cell);
        match self {
            Target::Schema(schema) => match name {
                "id" => schema.id = Some(text),
                "name" => schema.name = Some(text),
                "title" => schema.title = Some(text),
                "description" => schema.description = Some(text),
                "version" => schema.version = Some(text),
                "license" => schema.license = Some(text),
                "default_prefix" => schema.default_prefix = Some(text),
                "default_range" => schema.default_range = Some(text),
                "imports" => schema.imports.extend(column.values(name, cell)),
                _ => {
                    schema.extra.insert(name.to_string(), yaml(text));
                }
            },
            Target::Class(class) => match name {
                "description" => class.description = Some(text),
                "title" => class.title = Some(text),
                "is_a" => class.is_a = Some(text),
                "class_uri" => class.class_uri = Some(text),
                "abstract" => class.is_abstract = Some(column.bool_value(sheet, cell)?),
                "mixin" => class.mixin = Some(column.bool_value(sheet, cell)?),
                "mixins" => class.mixins.extend(column.values(name, cell)),
                "in_subset" => class.in_subset.extend(column.values(name, cell)),
                "exact_mappings" => class.exact_mappings.extend(column.values(name, cell)),
                "aliases" => class.aliases.extend(column.values(name, cell)),
                "slots" => class.slots.extend(column.values(name, cell)),
                _ => {
                    class.extra.insert(name.to_string(), yaml(text));
                }
            },
            Target::Slot(slot) => match name {
                "description" => slot.description = Some(text),
                "title" => slot.title = Some(text),
                "is_a" => slot.is_a = Some(text),
                "range" => slot.range = Some(text),
                "slot_uri" => slot.slot_uri = Some(text),
                "pattern" => slot.pattern = Some(text),
                "required" => slot.required = Some(column.bool_value(sheet, cell)?),
                "multivalued" => slot.multivalued = Some(column.bool_value(sheet, cell)?),
                "inlined" => slot.inlined = Some(column.bool_value(sheet, cell)?),
                "identifier" => slot.identifier = Some(column.bool_value(sheet, cell)?),
                "mixins" => slot.mixins.extend(column.values(name, cell)),
                "in_subset" => slot.in_subset.extend(column.values(name, cell)),
                "exact_mappings" => slot.exact_mappings.extend(column.values(name, cell)),
                "aliases" => slot.aliases.extend(column.values(name, cell)),
                "any_of" | "exactly_one_of" => {
                    let inner_key = column.settings.inner_key.as_deref().unwrap_or("range");
                    let expressions = column.values(name, cell).into_iter().map(|value| {
                        if inner_key == "range" {
                            AnonymousSlotExpression::with_range(value)
                        } else {
                            let mut expression = AnonymousSlotExpression::default();
                            expression.extra.insert(inner_key.to_string(), yaml(value));
                            expression
                        }
                    });
                    if name == "any_of" {
                        slot.any_of.extend(expressions);
                    } else {
                        slot.exactly_one_of.extend(expressions);
                    }
                }
                _ => {
                    slot.extra.insert(name.to_string(), yaml(text));
                }
            },
            Target::Enum(definition) => match name {
                "description" => definition.description = Some(text),
                "title" => definition.title = Some(text),
                "is_a" => definition.is_a = Some(text),
                "enum_uri" => definition.enum_uri = Some(text),
                "mixins" => definition.mixins.extend(column.values(name, cell)),
                _ => {
                    definition.extra.insert(name.to_string(), yaml(text));
                }
            },
            Target::Value(value) => match name {
                "description" => value.description = Some(text),
                "title" => value.title = Some(text),
                "meaning" => value.meaning = Some(text),
                _ => {
                    value.extra.insert(name.to_string(), yaml(text));
                }
            },
        }
        Ok(())
    }
}

/// Turns model sheets into a [`SchemaDefinition`]
#[derive(Debug, Default)]
pub struct SchemaMaker {
    schema: SchemaDefinition,
}

impl SchemaMaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_schema(mut self, sheets: &[Sheet]) -> Result<SchemaDefinition> {
        for sheet in sheets {
            self.add_sheet(sheet)?;
        }

        let mut schema = self.schema;
        let name = schema
            .name
            .get_or_insert_with(|| DEFAULT_SCHEMA_NAME.to_string())
            .clone();
        if schema.id.is_none() {
            schema.id = Some(format!("http://example.org/{}", name));
        }
        if !schema.imports.iter().any(|import| import == LINKML_TYPES_IMPORT) {
            schema.imports.insert(0, LINKML_TYPES_IMPORT.to_string());
        }
        schema
            .prefixes
            .entry(LINKML_PREFIX.to_string())
            .or_insert_with(|| LINKML_PREFIX_REFERENCE.to_string());
        Ok(schema)
    }

    fn add_sheet(&mut self, sheet: &Sheet) -> Result<()> {
        let layout = SheetLayout::from_sheet(sheet)?;
        let schema_table = layout.has(&[
            Descriptor::Schema,
            Descriptor::Prefix,
            Descriptor::PrefixReference,
        ]);

        let mut rows = 0;
        for row in sheet.rows.iter().skip(layout.data_start) {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            if self.add_row(sheet, &layout, row, schema_table)? {
                rows += 1;
            }
        }
        debug!(sheet = %sheet.name, rows, "Added sheet to schema");
        Ok(())
    }

    fn add_row(
        &mut self,
        sheet: &Sheet,
        layout: &SheetLayout,
        row: &[String],
        schema_table: bool,
    ) -> Result<bool> {
        let class_name = layout.main_value(row, &[Descriptor::Class]);
        let enum_name = layout.main_value(row, &[Descriptor::Enum]);
        let value_name = layout.main_value(row, &[Descriptor::PermissibleValue]);
        let slot_name = layout.main_value(row, &[Descriptor::Slot, Descriptor::Attribute]);
        let as_attribute = layout.has(&[Descriptor::Attribute]);

        let schema = &mut self.schema;
        let mut target = if let Some(enum_name) = enum_name {
            let definition = schema.enums.entry(enum_name.to_string()).or_default();
            match value_name {
                Some(value) => Target::Value(
                    definition
                        .permissible_values
                        .entry(value.to_string())
                        .or_default(),
                ),
                None => Target::Enum(definition),
            }
        } else if let Some(slot_name) = slot_name {
            match class_name {
                Some(class_name) if as_attribute => {
                    let class = schema.classes.entry(class_name.to_string()).or_default();
                    Target::Slot(class.attributes.entry(slot_name.to_string()).or_default())
                }
                Some(class_name) => {
                    schema.slots.entry(slot_name.to_string()).or_default();
                    let class = schema.classes.entry(class_name.to_string()).or_default();
                    if !class.slots.iter().any(|slot| slot == slot_name) {
                        class.slots.push(slot_name.to_string());
                    }
                    Target::Slot(class.slot_usage.entry(slot_name.to_string()).or_default())
                }
                None => Target::Slot(schema.slots.entry(slot_name.to_string()).or_default()),
            }
        } else if let Some(class_name) = class_name {
            Target::Class(schema.classes.entry(class_name.to_string()).or_default())
        } else if schema_table {
            if let Some(name) = layout.main_value(row, &[Descriptor::Schema]) {
                schema.name = Some(name.to_string());
            }
            let prefix = layout.main_value(row, &[Descriptor::Prefix]);
            let reference = layout.main_value(row, &[Descriptor::PrefixReference]);
            if let (Some(prefix), Some(reference)) = (prefix, reference) {
                schema.prefixes.insert(prefix.to_string(), reference.to_string());
            }
            Target::Schema(schema)
        } else {
            return Ok(false);
        };

        let (mut local_source, mut local_value) = (None, None);
        for column in &layout.columns {
            let Descriptor::Metaslot(name) = &column.descriptor else {
                continue;
            };
            let Some(cell) = row.get(column.index).filter(|cell| !cell.trim().is_empty()) else {
                continue;
            };
            if name == "local_names" {
                match column.settings.inner_key.as_deref() {
                    Some("local_name_source") => local_source = Some(cell.trim().to_string()),
                    _ => local_value = Some(cell.trim().to_string()),
                }
                continue;
            }
            target.apply(&sheet.name, name, column, cell)?;
        }

        if let (Some(source), Some(value)) = (local_source, local_value) {
            match &mut target {
                Target::Slot(slot) => {
                    slot.local_names.insert(
                        source.clone(),
                        LocalName {
                            local_name_source: source,
                            local_name_value: value,
                        },
                    );
                }
                _ => warn!(sheet = %sheet.name, "Local names are only supported on slots"),
            }
        }
        Ok(true)
    }
}

/// Add definitions for slots that classes use but the schema never declares
pub fn repair_schema(mut schema: SchemaDefinition) -> SchemaDefinition {
    let mut missing = Vec::new();
    for (class_name, class) in &schema.classes {
        for slot in &class.slots {
            if !schema.slots.contains_key(slot) {
                missing.push((class_name.clone(), slot.clone()));
            }
        }
    }
    for (class_name, slot) in missing {
        warn!("Fixing missing slot {} in class {}", slot, class_name);
        schema.slots.entry(slot).or_default();
    }
    schema
}

/// BICAN specific cleanup
///
/// Drops the `name` slot, slots already defined by imported schemas found as
/// `<import>.yaml` under `imports_dir`, and subsets without a description or
/// source schema.
pub fn bican_fix(mut schema: SchemaDefinition, imports_dir: &Path) -> Result<SchemaDefinition> {
    schema.slots.remove("name");

    for import in schema.imports.clone() {
        let path = imports_dir.join(format!("{}.yaml", import));
        if !path.exists() {
            continue;
        }
        let imported = SchemaDefinition::from_path(&path)?;
        for slot in imported.slots.keys() {
            if schema.slots.remove(slot).is_some() {
                debug!(slot = %slot, import = %import, "Removed slot defined by import");
            }
        }
    }

    schema
        .subsets
        .retain(|_, subset| subset.description.is_some() || subset.from_schema.is_some());
    Ok(schema)
}

/// Copy the classes and slots of a template schema into `schema`
pub fn add_template(mut schema: SchemaDefinition, template: &Path) -> Result<SchemaDefinition> {
    let template = SchemaDefinition::from_path(template)?;
    schema.classes.extend(template.classes);
    schema.slots.extend(template.slots);
    Ok(schema)
}

#[derive(Debug, Clone)]
pub struct Schema2ModelOptions {
    pub fix_tsv: bool,
    pub fix_tsv_save: bool,
    pub repair: bool,
    pub fix_bican_model: bool,
    pub tsv_fix: TsvFixOptions,
    pub template: Option<PathBuf>,
    /// Directory searched for `<import>.yaml` files by [`bican_fix`]
    pub imports_dir: PathBuf,
}

impl Default for Schema2ModelOptions {
    fn default() -> Self {
        Self {
            fix_tsv: true,
            fix_tsv_save: false,
            repair: true,
            fix_bican_model: true,
            tsv_fix: TsvFixOptions::default(),
            template: None,
            imports_dir: PathBuf::from("."),
        }
    }
}

/// Run the whole sheets to schema pipeline
pub fn schema2model(sheet_paths: &[PathBuf], options: &Schema2ModelOptions) -> Result<SchemaDefinition> {
    let Some(first) = sheet_paths.first() else {
        return Err(SchemaError::sheet("schema2model", "no spreadsheets given"));
    };
    let sheet_dir = first.parent().unwrap_or_else(|| Path::new("."));

    let template = match &options.template {
        Some(template) => Some(template.clone()),
        None => Some(sheet_dir.join(TEMPLATE_FILE)).filter(|path| path.exists()),
    };

    let mut sheets = Vec::with_capacity(sheet_paths.len());
    for path in sheet_paths {
        let sheet = Sheet::from_path(path)?;
        if !options.fix_tsv {
            sheets.push(sheet);
            continue;
        }

        let fixed = fix_sheet(&sheet, options.tsv_fix)?;
        if options.fix_tsv_save {
            let dir = sheet_dir.join(FIXED_SHEETS_DIR);
            std::fs::create_dir_all(&dir).map_err(|e| SchemaError::io(&dir, e))?;
            let file_name = path.file_name().map(PathBuf::from).unwrap_or_default();
            fixed.write_tsv(&dir.join(file_name))?;
        }
        sheets.push(fixed);
    }

    let mut schema = SchemaMaker::new().create_schema(&sheets)?;
    if options.repair {
        schema = repair_schema(schema);
    }
    if options.fix_bican_model {
        schema = bican_fix(schema, &options.imports_dir)?;
    }
    if let Some(template) = template {
        info!(template = %template.display(), "Adding template classes");
        schema = add_template(schema, &template)?;
    }
    Ok(schema)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn tsv(rows: &[&[&str]]) -> String {
        rows.iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn slots_sheet() -> Sheet {
        let text = tsv(&[
            &["LinkML Slot or Attribute Name", "SubGroup/LinkML Class Name", "Multivalued (True/False)", "ExactlyOneOf", "Data Type/Value Set", "NIMP Terminology NHash"],
            &["> attribute", "class", "multivalued", "ignore", "range", "exact_mappings: {curie_prefix: NIMP}"],
            &[">", "", "", "", "", ""],
            &["age", "Donor", "False", "", "integer", "DO 01"],
            &["was_derived_from", "Specimen", "False", "", "Donor", ""],
            &["input", "Pool", "True", "True", "Tissue|Donor", ""],
            &["label", "Donor", "False", "", "string|Donor", ""],
            &["note", "Donor", "", "", "", ""],
        ]);
        Sheet::from_tsv_str("slots.tsv", &text).unwrap()
    }

    #[test]
    fn test_fix_sheet_moves_ranges() {
        let fixed = fix_sheet(&slots_sheet(), TsvFixOptions::default()).unwrap();
        assert_eq!(
            fixed.rows[1],
            vec!["> attribute", "class", "multivalued", "ignore", "range", "any_of", "exactly_one_of", "inlined", "exact_mappings: {curie_prefix: NIMP}"]
        );
        assert_eq!(fixed.rows[0][5], "Data Type/Value Set: any_of");
        assert_eq!(fixed.rows[2][6], "inner_key: range");

        // mapping cells, simple ranges
        assert_eq!(fixed.rows[3][8], "DO%2001");
        assert_eq!(fixed.rows[3][4..8], ["integer", "", "", ""]);
        // class range gains an id reference
        assert_eq!(fixed.rows[4][4..8], ["", "Donor|string", "", "True"]);
        // multivalued + exactly one of
        assert_eq!(fixed.rows[5][4..8], ["", "", "Tissue|Donor|string", "True"]);
        // ranges containing string are left alone apart from the union move
        assert_eq!(fixed.rows[6][4..8], ["", "string|Donor", "", ""]);
    }

    #[test]
    fn test_fix_sheet_without_inlining() {
        let options = TsvFixOptions {
            inlined: false,
            ref_by_ind: true,
        };
        let fixed = fix_sheet(&slots_sheet(), options).unwrap();
        assert_eq!(fixed.rows[1][7], "ignore");
        assert_eq!(fixed.rows[4][4..8], ["Donor", "", "", ""]);
    }

    #[test]
    fn test_fix_sheet_requires_headers() {
        let sheet = Sheet::from_tsv_str("short.tsv", "a\tb\n> class\tis_a").unwrap();
        assert!(fix_sheet(&sheet, TsvFixOptions::default()).is_err());
    }

    #[test]
    fn test_schema_from_fixed_slots() {
        let fixed = fix_sheet(&slots_sheet(), TsvFixOptions::default()).unwrap();
        let schema = SchemaMaker::new().create_schema(&[fixed]).unwrap();

        let donor = &schema.classes["Donor"];
        assert_eq!(donor.attributes["age"].range.as_deref(), Some("integer"));
        assert_eq!(donor.attributes["age"].exact_mappings, vec!["NIMP:DO%2001"]);
        assert_eq!(donor.attributes["age"].multivalued, Some(false));
        assert_eq!(donor.attributes["note"], SlotDefinition::default());

        let derived = &schema.classes["Specimen"].attributes["was_derived_from"];
        assert_eq!(derived.inlined, Some(true));
        assert_eq!(derived.ranges(), vec!["Donor", "string"]);

        let input = &schema.classes["Pool"].attributes["input"];
        assert_eq!(input.exactly_one_of.len(), 3);
        assert!(input.any_of.is_empty());

        assert_eq!(schema.name.as_deref(), Some(DEFAULT_SCHEMA_NAME));
        assert_eq!(schema.imports, vec!["linkml:types"]);
    }

    #[test]
    fn test_schema_classes_enums_and_prefixes() {
        let classes = Sheet::from_tsv_str(
            "classes.tsv",
            &tsv(&[
                &["Class Name", "Inheritance: is_a", "Inheritance: mixin", "Description"],
                &["> class", "is_a", "mixins", "description"],
                &[">", "", "internal_separator: \"|\"", ""],
                &["Donor", "ProvEntity", "Thing|Other", "A donor"],
            ]),
        )
        .unwrap();
        let enums = Sheet::from_tsv_str(
            "enums.tsv",
            &tsv(&[
                &["Value Set Name", "Permissible Value", "Description", "NIMP Terminology NHash"],
                &["> enum", "permissible_value", "description", "meaning: {curie_prefix: NIMP}"],
                &[">", "", "", ""],
                &["Sex", "", "Biological sex", ""],
                &["Sex", "Male", "", "PV-1"],
            ]),
        )
        .unwrap();
        let prefixes = Sheet::from_tsv_str(
            "prefixes.tsv",
            &tsv(&[
                &["Schema Name", "Title", "ID", "Imports", "Prefix", "Prefix URI"],
                &["> schema", "title", "id", "imports", "prefix", "prefix_reference"],
                &["bican_donor", "Donor schema", "https://example.org/donor", "", "", ""],
                &["", "", "", "bican_core", "", ""],
                &["", "", "", "", "bican", "https://identifiers.org/brain-bican/vocab/"],
            ]),
        )
        .unwrap();

        let schema = SchemaMaker::new()
            .create_schema(&[prefixes, classes, enums])
            .unwrap();
        assert_eq!(schema.name.as_deref(), Some("bican_donor"));
        assert_eq!(schema.title.as_deref(), Some("Donor schema"));
        assert_eq!(schema.id.as_deref(), Some("https://example.org/donor"));
        assert_eq!(schema.imports, vec!["linkml:types", "bican_core"]);
        assert_eq!(schema.prefixes["bican"], "https://identifiers.org/brain-bican/vocab/");
        assert_eq!(schema.prefixes["linkml"], LINKML_PREFIX_REFERENCE);

        let donor = &schema.classes["Donor"];
        assert_eq!(donor.parents(), vec!["ProvEntity", "Thing", "Other"]);
        assert_eq!(donor.description.as_deref(), Some("A donor"));

        let sex = &schema.enums["Sex"];
        assert_eq!(sex.description.as_deref(), Some("Biological sex"));
        assert_eq!(sex.permissible_values["Male"].meaning.as_deref(), Some("NIMP:PV-1"));
    }

    #[test]
    fn test_slot_rows_with_local_names() {
        let sheet = Sheet::from_tsv_str(
            "slots.tsv",
            &tsv(&[
                &["Field", "Slot", "Class", "Required", "Local Name", "Local Source"],
                &["> alias", "slot", "class", "is_required", "local_names", "local_names"],
                &[">", "", "", "", "inner_key: local_name_value", "inner_key: local_name_source"],
                &["Donor Age", "age", "Donor", "TRUE", "donor_age", "NIMP"],
                &["", "species", "", "maybe", "", ""],
            ]),
        )
        .unwrap();
        let err = SchemaMaker::new().create_schema(&[sheet.clone()]).unwrap_err();
        assert!(err.to_string().contains("'maybe' is not a boolean"));

        let mut valid = sheet;
        valid.rows.pop();
        let schema = SchemaMaker::new().create_schema(&[valid]).unwrap();
        let donor = &schema.classes["Donor"];
        assert_eq!(donor.slots, vec!["age"]);
        let usage = &donor.slot_usage["age"];
        assert_eq!(usage.required, Some(true));
        assert_eq!(usage.aliases, vec!["Donor Age"]);
        assert_eq!(usage.local_names["NIMP"].local_name_value, "donor_age");
        assert!(schema.slots.contains_key("age"));
    }

    #[test]
    fn test_repair_and_bican_fix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bican_core.yaml"),
            "name: bican_core\nslots:\n  id:\n",
        )
        .unwrap();

        let mut schema = SchemaDefinition::from_yaml_str(
            "name: s\nimports: [bican_core]\nsubsets:\n  empty:\n  described:\n    description: kept\nslots:\n  name:\n  id:\nclasses:\n  Donor:\n    slots: [age, id]\n",
        )
        .unwrap();
        schema = repair_schema(schema);
        assert!(schema.slots.contains_key("age"));

        let schema = bican_fix(schema, dir.path()).unwrap();
        let slots: Vec<&str> = schema.slots.keys().map(String::as_str).collect();
        assert_eq!(slots, vec!["age"]);
        assert_eq!(schema.subsets.keys().collect::<Vec<_>>(), vec!["described"]);
    }
}
