// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Subject database access: file locations, transforms and surface meshes.

The mapper only needs three things from a subject database, captured by
[`SurfaceDatabase`]. Two implementations are provided: [`FilesystemDatabase`] reads JSON
files from a directory tree, [`MemoryDatabase`] keeps everything in process and only
touches disk for cache files and transform timestamps.
*/

use crate::error::{MapperError, MapperResult};
use crate::transform::{AffineTransform, CoordinateTransform};
use cortimap_structures::{Hemisphere, Hemispheres, Point3, SurfaceMesh, Triangle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Geometric representation of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// True cortical geometry
    Fiducial,
    /// Unfolded layout, used for neighborhood structure
    Flat,
}

impl SurfaceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceKind::Fiducial => "fiducial",
            SurfaceKind::Flat => "flat",
        }
    }
}

impl Display for SurfaceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Post-processing applied when loading a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceOptions {
    /// Concatenate both hemispheres into one mesh
    pub merge: bool,
    /// Shift hemispheres laterally so they do not overlap
    pub nudge: bool,
}

/// A loaded surface, either per hemisphere or merged.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    Split(Hemispheres<SurfaceMesh>),
    Merged(SurfaceMesh),
}

impl Surface {
    pub fn into_hemispheres(self) -> MapperResult<Hemispheres<SurfaceMesh>> {
        match self {
            Surface::Split(meshes) => Ok(meshes),
            Surface::Merged(_) => Err(MapperError::Database(
                "expected per-hemisphere surfaces, got a merged mesh".to_string(),
            )),
        }
    }
}

/// Path templates for one subject. `{xfmname}` and `{projection}` are substituted on use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectFiles {
    xfms: String,
    projcache: String,
}

impl SubjectFiles {
    pub fn new(xfms: impl Into<String>, projcache: impl Into<String>) -> Self {
        Self {
            xfms: xfms.into(),
            projcache: projcache.into(),
        }
    }

    pub fn transform_template(&self) -> &str {
        &self.xfms
    }

    pub fn cache_template(&self) -> &str {
        &self.projcache
    }

    pub fn transform_path(&self, xfmname: &str) -> PathBuf {
        PathBuf::from(self.xfms.replace("{xfmname}", xfmname))
    }

    pub fn cache_path(&self, xfmname: &str, projection: &str) -> PathBuf {
        PathBuf::from(
            self.projcache
                .replace("{xfmname}", xfmname)
                .replace("{projection}", projection),
        )
    }
}

/// Source of transforms and surfaces for a mapper build.
pub trait SurfaceDatabase: Send + Sync {
    /// File templates for `subject`.
    fn files(&self, subject: &str) -> MapperResult<SubjectFiles>;

    /// Loads the named coordinate transform.
    fn transform(&self, subject: &str, xfmname: &str) -> MapperResult<Box<dyn CoordinateTransform>>;

    /// Loads both hemispheres of a surface exactly as stored.
    fn hemispheres(&self, subject: &str, kind: SurfaceKind) -> MapperResult<Hemispheres<SurfaceMesh>>;

    /// Loads a surface, applying the requested nudge and merge.
    fn surface(
        &self,
        subject: &str,
        kind: SurfaceKind,
        options: SurfaceOptions,
    ) -> MapperResult<Surface> {
        let mut meshes = self.hemispheres(subject, kind)?;
        if options.nudge {
            meshes = nudge(meshes)?;
        }
        if options.merge {
            Ok(Surface::Merged(merge(meshes)?))
        } else {
            Ok(Surface::Split(meshes))
        }
    }
}

/// Shifts the left hemisphere so its maximum x is 0 and the right so its minimum x is 0.
pub fn nudge(meshes: Hemispheres<SurfaceMesh>) -> MapperResult<Hemispheres<SurfaceMesh>> {
    meshes.try_map_with(|side, mesh| {
        let (mut points, polygons) = mesh.into_parts();
        let xs = points.iter().map(|p| p[0]);
        let offset = match side {
            Hemisphere::Left => xs.fold(f64::NEG_INFINITY, f64::max),
            Hemisphere::Right => xs.fold(f64::INFINITY, f64::min),
        };
        if offset.is_finite() {
            for point in &mut points {
                point[0] -= offset;
            }
        }
        Ok(SurfaceMesh::new(points, polygons)?)
    })
}

/// Concatenates right after left, offsetting right face indices by the left point count.
pub fn merge(meshes: Hemispheres<SurfaceMesh>) -> MapperResult<SurfaceMesh> {
    let (mut points, mut polygons) = meshes.left.into_parts();
    let offset = points.len();
    let (right_points, right_polygons) = meshes.right.into_parts();
    points.extend(right_points);
    polygons.extend(
        right_polygons
            .into_iter()
            .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
    );
    Ok(SurfaceMesh::new(points, polygons)?)
}

/// On-disk form of one hemisphere mesh.
#[derive(Debug, Serialize, Deserialize)]
struct MeshFile {
    points: Vec<Point3>,
    polygons: Vec<Triangle>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> MapperResult<T> {
    let bytes = fs::read(path).map_err(|e| {
        MapperError::Database(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| MapperError::Database(format!("cannot parse {}: {}", path.display(), e)))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> MapperResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec(value)?)?;
    Ok(())
}

/// Directory-backed database.
///
/// ```text
/// <root>/<subject>/transforms/<xfmname>.json
/// <root>/<subject>/surfaces/<fiducial|flat>_<lh|rh>.json
/// <root>/<subject>/cache/<xfmname>_<projection>.mapcache
/// ```
#[derive(Debug, Clone)]
pub struct FilesystemDatabase {
    root: PathBuf,
}

impl FilesystemDatabase {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn subject_dir(&self, subject: &str) -> MapperResult<PathBuf> {
        let dir = self.root.join(subject);
        if !dir.is_dir() {
            return Err(MapperError::Database(format!(
                "unknown subject '{}' (no directory {})",
                subject,
                dir.display()
            )));
        }
        Ok(dir)
    }

    fn surface_path(&self, subject: &str, kind: SurfaceKind, side: Hemisphere) -> PathBuf {
        self.root
            .join(subject)
            .join("surfaces")
            .join(format!("{}_{}.json", kind.name(), side.tag()))
    }

    /// Writes a transform file, creating the subject directory as needed.
    pub fn save_transform(
        &self,
        subject: &str,
        xfmname: &str,
        transform: &AffineTransform,
    ) -> MapperResult<PathBuf> {
        let path = self
            .root
            .join(subject)
            .join("transforms")
            .join(format!("{}.json", xfmname));
        write_json(&path, transform)?;
        Ok(path)
    }

    /// Writes one hemisphere of a surface.
    pub fn save_surface(
        &self,
        subject: &str,
        kind: SurfaceKind,
        side: Hemisphere,
        mesh: &SurfaceMesh,
    ) -> MapperResult<PathBuf> {
        let path = self.surface_path(subject, kind, side);
        let file = MeshFile {
            points: mesh.points().to_vec(),
            polygons: mesh.polygons().to_vec(),
        };
        write_json(&path, &file)?;
        Ok(path)
    }
}

impl SurfaceDatabase for FilesystemDatabase {
    fn files(&self, subject: &str) -> MapperResult<SubjectFiles> {
        let dir = self.subject_dir(subject)?;
        let dir = dir.to_string_lossy();
        Ok(SubjectFiles::new(
            format!("{}/transforms/{{xfmname}}.json", dir),
            format!("{}/cache/{{xfmname}}_{{projection}}.mapcache", dir),
        ))
    }

    fn transform(&self, subject: &str, xfmname: &str) -> MapperResult<Box<dyn CoordinateTransform>> {
        let path = self.files(subject)?.transform_path(xfmname);
        debug!(subject, xfmname, path = %path.display(), "loading transform");
        let transform: AffineTransform = read_json(&path)?;
        Ok(Box::new(transform))
    }

    fn hemispheres(&self, subject: &str, kind: SurfaceKind) -> MapperResult<Hemispheres<SurfaceMesh>> {
        self.subject_dir(subject)?;
        Hemispheres::new(Hemisphere::Left, Hemisphere::Right).try_map_with(|_, side| {
            let path = self.surface_path(subject, kind, side);
            let file: MeshFile = read_json(&path)?;
            Ok(SurfaceMesh::new(file.points, file.polygons)?)
        })
    }
}

#[derive(Debug, Default)]
struct MemorySubject {
    transforms: HashMap<String, AffineTransform>,
    surfaces: HashMap<SurfaceKind, Hemispheres<SurfaceMesh>>,
}

/// In-process database.
///
/// Registering a transform also writes it under `<dir>/<subject>/transforms/`, so cache
/// staleness compares real file timestamps exactly as with [`FilesystemDatabase`].
#[derive(Debug)]
pub struct MemoryDatabase {
    dir: PathBuf,
    subjects: HashMap<String, MemorySubject>,
    transform_loads: AtomicUsize,
}

impl MemoryDatabase {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            subjects: HashMap::new(),
            transform_loads: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Registers a transform and returns the path of its timestamp file.
    pub fn insert_transform(
        &mut self,
        subject: &str,
        xfmname: &str,
        transform: AffineTransform,
    ) -> MapperResult<PathBuf> {
        let path = self
            .dir
            .join(subject)
            .join("transforms")
            .join(format!("{}.json", xfmname));
        write_json(&path, &transform)?;
        self.subjects
            .entry(subject.to_string())
            .or_default()
            .transforms
            .insert(xfmname.to_string(), transform);
        Ok(path)
    }

    pub fn insert_surface(&mut self, subject: &str, kind: SurfaceKind, meshes: Hemispheres<SurfaceMesh>) {
        self.subjects
            .entry(subject.to_string())
            .or_default()
            .surfaces
            .insert(kind, meshes);
    }

    /// Number of transform loads served so far; each mapper build loads exactly one.
    pub fn transform_loads(&self) -> usize {
        self.transform_loads.load(Ordering::Relaxed)
    }

    fn subject(&self, subject: &str) -> MapperResult<&MemorySubject> {
        self.subjects
            .get(subject)
            .ok_or_else(|| MapperError::Database(format!("unknown subject '{}'", subject)))
    }
}

impl SurfaceDatabase for MemoryDatabase {
    fn files(&self, subject: &str) -> MapperResult<SubjectFiles> {
        self.subject(subject)?;
        let dir = self.dir.join(subject);
        let dir = dir.to_string_lossy();
        Ok(SubjectFiles::new(
            format!("{}/transforms/{{xfmname}}.json", dir),
            format!("{}/cache/{{xfmname}}_{{projection}}.mapcache", dir),
        ))
    }

    fn transform(&self, subject: &str, xfmname: &str) -> MapperResult<Box<dyn CoordinateTransform>> {
        let transform = self
            .subject(subject)?
            .transforms
            .get(xfmname)
            .cloned()
            .ok_or_else(|| {
                MapperError::Database(format!("unknown transform '{}' for '{}'", xfmname, subject))
            })?;
        self.transform_loads.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(transform))
    }

    fn hemispheres(&self, subject: &str, kind: SurfaceKind) -> MapperResult<Hemispheres<SurfaceMesh>> {
        self.subject(subject)?
            .surfaces
            .get(&kind)
            .cloned()
            .ok_or_else(|| {
                MapperError::Database(format!("no {} surface for '{}'", kind, subject))
            })
    }
}
