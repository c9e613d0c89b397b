// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! VTK XML unstructured grid (`.vtu`) and collection (`.pvd`) import.
//!
//! Unlike the line-based importers, VTK documents are parsed strictly: a
//! missing element, an unsupported encoding or a single malformed number
//! fails the whole document with a [`VtkError`].
//!
//! Triangles are unrolled into non-shared vertices (three per triangle) so
//! that per-cell data can be carried as per-vertex properties.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use geosurf_core::{parse_f64, parse_f64_list, parse_u32_list, LineReader};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::mesh::Vertex;
use crate::TriangleMesh;

/// Errors that fail a VTK document
#[derive(Error, Debug)]
pub enum VtkError {
    #[error(transparent)]
    Io(#[from] geosurf_core::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    #[error("Invalid number '{token}' in array '{array}'")]
    InvalidNumber { array: String, token: String },

    #[error("Array '{array}' uses unsupported format '{format}' (only ascii is supported)")]
    UnsupportedEncoding { array: String, format: String },

    #[error("Malformed array '{array}': {reason}")]
    MalformedArray { array: String, reason: String },

    #[error("Connectivity index {index} out of range for {count} points")]
    InvalidConnectivity { index: u32, count: usize },

    #[error("Cell {cell} has {size} points, only triangles are supported")]
    UnsupportedCell { cell: usize, size: usize },
}

/// Result type for VTK parsing
pub type VtkResult<T> = std::result::Result<T, VtkError>;

/// Section of a `Piece` a data array belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Points,
    Cells,
    CellData,
}

impl Section {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"Points" => Some(Section::Points),
            b"Cells" => Some(Section::Cells),
            b"CellData" => Some(Section::CellData),
            _ => None,
        }
    }
}

/// A `DataArray` collected from the first piece
#[derive(Debug, Clone, Default)]
struct DataArray {
    name: String,
    format: Option<String>,
    text: String,
}

impl DataArray {
    fn from_start(start: &BytesStart<'_>) -> VtkResult<Self> {
        let mut array = DataArray::default();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            match attr.key.local_name().as_ref() {
                b"Name" => array.name = attr.unescape_value()?.into_owned(),
                b"format" => array.format = Some(attr.unescape_value()?.into_owned()),
                _ => {}
            }
        }
        Ok(array)
    }

    fn label(&self) -> &str {
        if self.name.is_empty() {
            "<unnamed>"
        } else {
            &self.name
        }
    }

    fn require_ascii(&self) -> VtkResult<()> {
        match &self.format {
            Some(format) if !format.eq_ignore_ascii_case("ascii") => {
                Err(VtkError::UnsupportedEncoding {
                    array: self.label().to_string(),
                    format: format.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn floats(&self) -> VtkResult<Vec<f64>> {
        self.require_ascii()?;
        parse_f64_list(self.text.as_bytes()).map_err(|e| self.number_error(e))
    }

    /// Values narrowed to `f32`; finite values beyond its range are invalid
    fn single_floats(&self) -> VtkResult<Vec<f32>> {
        self.floats()?
            .into_iter()
            .map(|value| {
                let narrowed = value as f32;
                if value.is_finite() && narrowed.is_infinite() {
                    Err(VtkError::InvalidNumber {
                        array: self.label().to_string(),
                        token: value.to_string(),
                    })
                } else {
                    Ok(narrowed)
                }
            })
            .collect()
    }

    fn indices(&self) -> VtkResult<Vec<u32>> {
        self.require_ascii()?;
        parse_u32_list(self.text.as_bytes()).map_err(|e| self.number_error(e))
    }

    fn number_error(&self, error: geosurf_core::Error) -> VtkError {
        match error {
            geosurf_core::Error::InvalidNumber { token } => VtkError::InvalidNumber {
                array: self.label().to_string(),
                token,
            },
            other => VtkError::Io(other),
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> VtkError {
        VtkError::MalformedArray {
            array: self.label().to_string(),
            reason: reason.into(),
        }
    }
}

/// Elements and arrays found in the first `Piece` of a document
#[derive(Debug, Default)]
struct PieceContent {
    has_vtk_file: bool,
    has_grid: bool,
    pieces: usize,
    has_points: bool,
    has_cells: bool,
    points: Vec<DataArray>,
    cells: Vec<DataArray>,
    cell_data: Vec<DataArray>,
}

impl PieceContent {
    fn push(&mut self, section: Section, array: DataArray) {
        match section {
            Section::Points => self.points.push(array),
            Section::Cells => self.cells.push(array),
            Section::CellData => self.cell_data.push(array),
        }
    }

    /// Record an element opening at `depth` below the document root
    fn open(&mut self, stack: &[Vec<u8>], name: &[u8]) {
        match (stack.len(), name) {
            (0, b"VTKFile") => self.has_vtk_file = true,
            (1, b"UnstructuredGrid") if self.has_vtk_file => self.has_grid = true,
            (2, b"Piece") if stack[1] == b"UnstructuredGrid" => self.pieces += 1,
            (3, b"Points") if self.in_first_piece(stack) => self.has_points = true,
            (3, b"Cells") if self.in_first_piece(stack) => self.has_cells = true,
            _ => {}
        }
    }

    fn in_first_piece(&self, stack: &[Vec<u8>]) -> bool {
        self.pieces == 1 && stack.len() >= 3 && stack[2] == b"Piece" && stack[1] == b"UnstructuredGrid"
    }

    /// Section of a `DataArray` opened with the given parent stack
    fn section_of(&self, stack: &[Vec<u8>]) -> Option<Section> {
        if stack.len() == 4 && self.in_first_piece(stack) {
            Section::from_name(&stack[3])
        } else {
            None
        }
    }
}

/// Collect the first piece's arrays from a VTU document
fn scan_document(xml: &str) -> VtkResult<PieceContent> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut content = PieceContent::default();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<(Section, DataArray)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let name = e.local_name().as_ref().to_vec();
                content.open(&stack, &name);
                if name == b"DataArray" {
                    if let Some(section) = content.section_of(&stack) {
                        current = Some((section, DataArray::from_start(e)?));
                    }
                }
                stack.push(name);
            }
            Event::Empty(ref e) => {
                let name = e.local_name();
                content.open(&stack, name.as_ref());
                if name.as_ref() == b"DataArray" {
                    if let Some(section) = content.section_of(&stack) {
                        content.push(section, DataArray::from_start(e)?);
                    }
                }
            }
            Event::Text(ref e) => {
                if let Some((_, array)) = current.as_mut() {
                    append_text(&mut array.text, e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if let Some((_, array)) = current.as_mut() {
                    append_text(&mut array.text, String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => {
                stack.pop();
                if e.local_name().as_ref() == b"DataArray" {
                    if let Some((section, array)) = current.take() {
                        content.push(section, array);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(content)
}

#[inline]
fn append_text(buffer: &mut String, text: Cow<'_, str>) {
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(&text);
}

/// Check `offsets` describes triangles only
fn check_triangle_offsets(offsets: &DataArray, connectivity_len: usize) -> VtkResult<()> {
    let mut previous = 0usize;
    for (cell, &offset) in offsets.indices()?.iter().enumerate() {
        let offset = offset as usize;
        let size = offset
            .checked_sub(previous)
            .ok_or_else(|| offsets.malformed("offsets are not increasing"))?;
        if size != 3 {
            return Err(VtkError::UnsupportedCell { cell, size });
        }
        previous = offset;
    }
    if previous != connectivity_len {
        return Err(offsets.malformed(format!(
            "last offset {} does not match connectivity length {}",
            previous, connectivity_len
        )));
    }
    Ok(())
}

/// VTU surface importer
#[derive(Debug, Clone, Copy, Default)]
pub struct VtkSurfaceImporter;

impl VtkSurfaceImporter {
    pub fn new() -> Self {
        Self
    }

    /// Import the first piece of a `.vtu` file
    pub fn import_file(&self, path: &Path) -> VtkResult<TriangleMesh> {
        let reader = LineReader::open(path)?;
        let xml = String::from_utf8_lossy(reader.bytes());
        let mesh = self.import_str(&xml)?;
        info!(
            path = %path.display(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            properties = mesh.properties().len(),
            "Imported VTU surface"
        );
        Ok(mesh)
    }

    /// Import the first piece of a VTU document
    pub fn import_str(&self, xml: &str) -> VtkResult<TriangleMesh> {
        let content = scan_document(xml)?;
        if !content.has_vtk_file {
            return Err(VtkError::MissingElement("VTKFile"));
        }
        if !content.has_grid {
            return Err(VtkError::MissingElement("UnstructuredGrid"));
        }
        if content.pieces == 0 {
            return Err(VtkError::MissingElement("Piece"));
        }
        if !content.has_points {
            return Err(VtkError::MissingElement("Points"));
        }
        if !content.has_cells {
            return Err(VtkError::MissingElement("Cells"));
        }

        let points_array = content
            .points
            .iter()
            .find(|a| a.name == "Coordinates")
            .or_else(|| content.points.first())
            .ok_or(VtkError::MissingElement("Points/DataArray"))?;
        let coordinates = points_array.floats()?;
        if coordinates.len() % 3 != 0 {
            return Err(points_array.malformed(format!(
                "{} values is not a whole number of xyz triples",
                coordinates.len()
            )));
        }
        let points: Vec<Vertex> = coordinates
            .chunks_exact(3)
            .map(|c| Vertex::new(c[0], c[1], -c[2]))
            .collect();

        let connectivity_array = content
            .cells
            .iter()
            .find(|a| a.name == "connectivity")
            .ok_or(VtkError::MissingElement("Cells/DataArray[@Name='connectivity']"))?;
        let connectivity = connectivity_array.indices()?;
        if connectivity.len() % 3 != 0 {
            return Err(connectivity_array.malformed(format!(
                "{} indices is not a whole number of triangles",
                connectivity.len()
            )));
        }
        if let Some(offsets) = content.cells.iter().find(|a| a.name == "offsets") {
            check_triangle_offsets(offsets, connectivity.len())?;
        }

        let mut vertices = Vec::with_capacity(connectivity.len());
        for &index in &connectivity {
            let point = points
                .get(index as usize)
                .ok_or(VtkError::InvalidConnectivity {
                    index,
                    count: points.len(),
                })?;
            vertices.push(*point);
        }
        if vertices.len() > u32::MAX as usize {
            return Err(connectivity_array.malformed("too many triangles"));
        }
        let indices: Vec<u32> = (0..vertices.len() as u32).collect();
        let vertex_count = vertices.len();

        let mut mesh = TriangleMesh::new(vertices, indices)
            .map_err(|e| connectivity_array.malformed(e.to_string()))?;

        for array in &content.cell_data {
            let values = array.single_floats()?;
            if values.len() * 3 != vertex_count {
                debug!(
                    property = array.label(),
                    values = values.len(),
                    triangles = vertex_count / 3,
                    "Dropping cell data with mismatched cell count"
                );
                continue;
            }
            if mesh.property_values(&array.name).is_some() {
                warn!(property = array.label(), "Ignoring repeated cell data name");
                continue;
            }
            let per_vertex: Vec<f32> = values
                .iter()
                .flat_map(|&v| std::iter::repeat(v).take(3))
                .collect();
            mesh = mesh
                .with_property(array.name.clone(), per_vertex)
                .map_err(|e| array.malformed(e.to_string()))?;
        }

        Ok(mesh)
    }
}

/// Import the first piece of a `.vtu` file
pub fn import_from_file(path: &Path) -> VtkResult<TriangleMesh> {
    VtkSurfaceImporter.import_file(path)
}

/// One snapshot of a PVD time series
#[derive(Debug, Clone, PartialEq)]
pub struct PvdDataset {
    pub timestep: f64,
    /// Absolute path of the snapshot file
    pub file: PathBuf,
}

/// List the datasets of a `.pvd` collection.
///
/// Relative `file` attributes are resolved against the PVD file's
/// directory. An unreadable or malformed file yields an empty list.
pub fn parse_pvd_datasets(path: &Path) -> Vec<PvdDataset> {
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let result = LineReader::open(path)
        .map_err(VtkError::from)
        .and_then(|reader| parse_pvd_str(&String::from_utf8_lossy(reader.bytes()), base_dir));
    match result {
        Ok(datasets) => datasets,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Could not read PVD collection");
            Vec::new()
        }
    }
}

/// Parse a PVD document, resolving dataset paths against `base_dir`.
///
/// `DataSet` entries without a `file` or `timestep` attribute are skipped;
/// a timestep that is not a number fails the document.
pub fn parse_pvd_str(xml: &str, base_dir: &Path) -> VtkResult<Vec<PvdDataset>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut has_collection = false;
    let mut datasets = Vec::new();

    loop {
        let (start, is_empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => {
                stack.pop();
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = start.local_name().as_ref().to_vec();
        let in_collection = stack.len() == 2 && stack[0] == b"VTKFile" && stack[1] == b"Collection";
        if stack.len() == 1 && stack[0] == b"VTKFile" && name == b"Collection" {
            has_collection = true;
        } else if in_collection && name == b"DataSet" {
            if let Some(dataset) = read_dataset(&start, base_dir)? {
                datasets.push(dataset);
            }
        }
        if !is_empty {
            stack.push(name);
        }
    }

    if !has_collection {
        return Err(VtkError::MissingElement("Collection"));
    }
    Ok(datasets)
}

fn read_dataset(start: &BytesStart<'_>, base_dir: &Path) -> VtkResult<Option<PvdDataset>> {
    let mut file = None;
    let mut timestep = None;
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        match attr.key.local_name().as_ref() {
            b"file" => file = Some(attr.unescape_value()?.into_owned()),
            b"timestep" => {
                let value = attr.unescape_value()?;
                let parsed = parse_f64(value.trim().as_bytes()).ok_or_else(|| {
                    VtkError::InvalidNumber {
                        array: "timestep".to_string(),
                        token: value.to_string(),
                    }
                })?;
                timestep = Some(parsed);
            }
            _ => {}
        }
    }

    let (Some(file), Some(timestep)) = (file, timestep) else {
        return Ok(None);
    };
    let joined = base_dir.join(file);
    let file = std::path::absolute(&joined).unwrap_or(joined);
    Ok(Some(PvdDataset { timestep, file }))
}
