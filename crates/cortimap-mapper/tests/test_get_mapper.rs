//! End-to-end mapper tests: build, cache, reload and apply.

use cortimap_mapper::{
    AffineTransform, CacheSettings, CacheStatus, FilesystemDatabase, InputLayout, MapperError,
    MapperOrigin, MapperService, MemoryDatabase, StaleReason, SurfaceDatabase, SurfaceKind,
    VertexInput,
};
use cortimap_projection::{KernelArgs, KernelDefaults, ProjectionKind};
use cortimap_structures::{Hemisphere, Hemispheres, Point3, SurfaceMesh, Triangle, VolumeShape};
use ndarray::{concatenate, Array1, Array2, Array4, ArrayD, Axis, IxDyn};
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::{tempdir, TempDir};

const SUBJECT: &str = "S1";

fn grid() -> VolumeShape {
    VolumeShape::new(4, 5, 6).unwrap()
}

/// A `nx × ny` sheet of unit-spaced vertices at height `origin[2]`, plus its flat twin.
fn sheet(nx: usize, ny: usize, origin: Point3, stray: Option<Point3>) -> (SurfaceMesh, SurfaceMesh) {
    let mut points = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            points.push([origin[0] + i as f64, origin[1] + j as f64, origin[2]]);
        }
    }
    let mut polygons: Vec<Triangle> = Vec::new();
    let v = |i: usize, j: usize| j * nx + i;
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            polygons.push([v(i, j), v(i + 1, j), v(i, j + 1)]);
            polygons.push([v(i + 1, j), v(i + 1, j + 1), v(i, j + 1)]);
        }
    }
    if let Some(point) = stray {
        points.push(point);
    }
    let flat_points = points.iter().map(|p| [p[0], p[1], 0.0]).collect();
    (
        SurfaceMesh::new(points, polygons.clone()).unwrap(),
        SurfaceMesh::new(flat_points, polygons).unwrap(),
    )
}

/// Left: 9 vertices inside the grid. Right: 4 inside plus one far outside.
fn subject_database(dir: &Path) -> MemoryDatabase {
    let mut db = MemoryDatabase::new(dir);
    let (left_fid, left_flat) = sheet(3, 3, [0.2, 0.1, 1.0], None);
    let (right_fid, right_flat) = sheet(2, 2, [3.0, 2.0, 2.6], Some([40.0, 40.0, 40.0]));
    db.insert_surface(SUBJECT, SurfaceKind::Fiducial, Hemispheres::new(left_fid, right_fid));
    db.insert_surface(SUBJECT, SurfaceKind::Flat, Hemispheres::new(left_flat, right_flat));
    db.insert_transform(SUBJECT, "identity", AffineTransform::identity(grid()))
        .unwrap();
    db.insert_transform(SUBJECT, "fullhead", AffineTransform::identity(grid()))
        .unwrap();
    db
}

fn service(settings: CacheSettings) -> (TempDir, MapperService<MemoryDatabase>) {
    let dir = tempdir().unwrap();
    let db = subject_database(dir.path());
    (dir, MapperService::new(db, settings))
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn bits(values: &[f64]) -> Vec<u64> {
    values.iter().map(|v| v.to_bits()).collect()
}

#[test]
fn test_nearest_round_trip_reproduces_mask() {
    let (_dir, service) = service(CacheSettings::default());
    let mapper = service
        .get_mapper(SUBJECT, "identity", "nearest", false, &KernelArgs::new())
        .unwrap();
    assert_eq!(mapper.n_vertices(), 14);

    let ones = ArrayD::<f64>::ones(IxDyn(&grid().as_array()));
    let forward = mapper.apply(ones.view()).unwrap();
    let combined: Array1<f64> = concatenate(
        Axis(0),
        &[
            forward.left.view().into_dimensionality().unwrap(),
            forward.right.view().into_dimensionality().unwrap(),
        ],
    )
    .unwrap();

    let back = mapper.backwards(VertexInput::Combined(combined.view())).unwrap();
    let footprint = (&back.left + &back.right).mapv(|v| v != 0.0);
    assert_eq!(footprint, mapper.mask());
    assert_eq!(mapper.mask().iter().filter(|&&m| m).count(), 13);
}

#[test]
fn test_cache_reload_is_bit_identical() {
    let (_dir, service) = service(CacheSettings::default());
    let args = KernelArgs::new().with("std", 1.5);
    let built = service
        .get_mapper(SUBJECT, "identity", "gaussian", false, &args)
        .unwrap();
    assert_eq!(built.origin(), MapperOrigin::Built);

    let cache_path = service
        .database()
        .files(SUBJECT)
        .unwrap()
        .cache_path("identity", "pointgauss_std1.5");
    assert!(cache_path.exists());

    let loaded = service
        .get_mapper(SUBJECT, "identity", "gaussian", false, &args)
        .unwrap();
    assert_eq!(loaded.origin(), MapperOrigin::Cache);
    assert_eq!(loaded.shape(), built.shape());
    for side in Hemisphere::BOTH {
        let (a, b) = (built.operators().get(side), loaded.operators().get(side));
        assert_eq!(a.shape(), b.shape());
        assert_eq!(a.indptr(), b.indptr());
        assert_eq!(a.indices(), b.indices());
        assert_eq!(bits(a.data()), bits(b.data()));
    }
}

#[test]
fn test_distinct_parameters_use_distinct_caches() {
    let (_dir, service) = service(CacheSettings::default());
    let narrow = KernelArgs::new().with("std", 1.0);
    let wide = KernelArgs::new().with("std", 1.75);
    service.get_mapper(SUBJECT, "identity", "gaussian", false, &narrow).unwrap();
    let second = service
        .get_mapper(SUBJECT, "identity", "gaussian", false, &wide)
        .unwrap();
    assert_eq!(second.origin(), MapperOrigin::Built);

    let files = service.database().files(SUBJECT).unwrap();
    assert!(files.cache_path("identity", "pointgauss_std1").exists());
    assert!(files.cache_path("identity", "pointgauss_std1.75").exists());
}

#[test]
fn test_default_parameters_name_the_cache() {
    let dir = tempdir().unwrap();
    let with_std = |std: f64| CacheSettings {
        defaults: KernelDefaults {
            gaussian_std: std,
            ..KernelDefaults::default()
        },
        ..CacheSettings::default()
    };

    let narrow = MapperService::new(subject_database(dir.path()), with_std(0.5));
    let first = narrow
        .get_mapper(SUBJECT, "identity", "gaussian", false, &KernelArgs::new())
        .unwrap();
    assert_eq!(first.origin(), MapperOrigin::Built);

    // same directory, only the configured default differs
    let wide = MapperService::new(subject_database(dir.path()), with_std(2.0));
    let second = wide
        .get_mapper(SUBJECT, "identity", "gaussian", false, &KernelArgs::new())
        .unwrap();
    assert_eq!(second.origin(), MapperOrigin::Built);
    assert_eq!(second.kind(), &ProjectionKind::Gaussian { std: 2.0 });
    assert!(second.operators().left.nnz() > first.operators().left.nnz());

    // an explicit keyword equal to the default reuses the default's file
    let explicit = wide
        .get_mapper(SUBJECT, "identity", "gaussian", false, &KernelArgs::new().with("std", 2.0))
        .unwrap();
    assert_eq!(explicit.origin(), MapperOrigin::Cache);

    let files = wide.database().files(SUBJECT).unwrap();
    assert!(files.cache_path("identity", "pointgauss_std0.5").exists());
    assert!(files.cache_path("identity", "pointgauss_std2").exists());
}

#[test]
fn test_kernel_larger_than_grid_rejected() {
    let (_dir, service) = service(CacheSettings::default());
    let result = service.get_mapper(
        SUBJECT,
        "identity",
        "gaussian",
        false,
        &KernelArgs::new().with("std", 1e300),
    );
    assert!(matches!(result, Err(MapperError::InvalidKernelParameter(_))));
}

#[test]
fn test_shape_dispatch() {
    let (_dir, service) = service(CacheSettings::default());
    let mapper = service
        .get_mapper(SUBJECT, "identity", "trilinear", false, &KernelArgs::new())
        .unwrap();

    let series = Array4::<f64>::from_elem((5, 4, 5, 6), 2.0);
    let out = mapper.apply(series.view().into_dyn()).unwrap();
    assert_eq!(out.left.shape(), &[5, 9]);
    assert_eq!(out.right.shape(), &[5, 5]);

    let per_vertex = Array1::from_iter((0..14).map(f64::from));
    let out = mapper.apply(per_vertex.view().into_dyn()).unwrap();
    assert_eq!(out.left, Array1::from_iter((0..9).map(f64::from)).into_dyn());
    assert_eq!(out.right, Array1::from_iter((9..14).map(f64::from)).into_dyn());
}

#[test]
fn test_invalid_shape_rejected() {
    let (_dir, service) = service(CacheSettings::default());
    let mapper = service
        .get_mapper(SUBJECT, "identity", "nearest", false, &KernelArgs::new())
        .unwrap();

    let masked = Array1::<f64>::ones(13);
    assert_eq!(mapper.layout_of(masked.shape()).unwrap(), InputLayout::MaskedVoxels);

    let wrong = Array1::<f64>::ones(15);
    assert!(matches!(
        mapper.apply(wrong.view().into_dyn()),
        Err(MapperError::ShapeMismatch(_))
    ));
    let wrong_grid = Array2::<f64>::ones((4, 5));
    assert!(matches!(
        mapper.apply(wrong_grid.view().into_dyn()),
        Err(MapperError::ShapeMismatch(_))
    ));
}

#[test]
fn test_staleness_follows_transform_mtime() {
    let (_dir, service) = service(CacheSettings::default());
    let args = KernelArgs::new();
    let files = service.database().files(SUBJECT).unwrap();
    let xfm_path = files.transform_path("fullhead");
    let cache_path = files.cache_path("fullhead", "pointnn");

    service.get_mapper(SUBJECT, "fullhead", "nearest", false, &args).unwrap();
    let loads_after_build = service.database().transform_loads();
    assert_eq!(loads_after_build, 1);

    let base = SystemTime::now() - Duration::from_secs(3600);
    set_mtime(&xfm_path, base);
    set_mtime(&cache_path, base + Duration::from_secs(60));

    let cached = service.get_mapper(SUBJECT, "fullhead", "nearest", false, &args).unwrap();
    assert_eq!(cached.origin(), MapperOrigin::Cache);
    assert_eq!(service.database().transform_loads(), loads_after_build);

    set_mtime(&cache_path, base - Duration::from_secs(60));
    assert_eq!(
        service.cache_status(SUBJECT, "fullhead", "nearest", false, &args).unwrap(),
        CacheStatus::Stale(StaleReason::OutOfDate)
    );
    let rebuilt = service.get_mapper(SUBJECT, "fullhead", "nearest", false, &args).unwrap();
    assert_eq!(rebuilt.origin(), MapperOrigin::Built);
    assert_eq!(service.database().transform_loads(), loads_after_build + 1);

    // the overwrite leaves a cache newer than the transform
    assert_eq!(
        service.cache_status(SUBJECT, "fullhead", "nearest", false, &args).unwrap(),
        CacheStatus::Fresh
    );

    let forced = service.get_mapper(SUBJECT, "fullhead", "nearest", true, &args).unwrap();
    assert_eq!(forced.origin(), MapperOrigin::Built);
}

#[test]
fn test_raw_color_gains_opaque_alpha() {
    let (_dir, service) = service(CacheSettings::default());
    let mapper = service
        .get_mapper(SUBJECT, "identity", "nearest", false, &KernelArgs::new())
        .unwrap();

    let rgb = Array2::from_shape_fn((3, 14), |(c, v)| (c * 14 + v) as u8);
    let out = mapper.apply_raw(rgb.view().into_dyn()).unwrap();
    assert_eq!(out.left.shape(), &[9, 4]);
    assert_eq!(out.right.shape(), &[5, 4]);
    for hemi in [&out.left, &out.right] {
        assert!(hemi.index_axis(Axis(1), 3).iter().all(|&a| a == 255));
    }
    assert_eq!(out.right[[0, 0]], 9);
}

#[test]
fn test_corrupt_cache_handling() {
    let (_dir, service) = service(CacheSettings::default());
    let args = KernelArgs::new();
    service.get_mapper(SUBJECT, "identity", "nearest", false, &args).unwrap();
    let cache_path = service
        .database()
        .files(SUBJECT)
        .unwrap()
        .cache_path("identity", "pointnn");

    fs::write(&cache_path, b"truncated").unwrap();
    let rebuilt = service.get_mapper(SUBJECT, "identity", "nearest", false, &args).unwrap();
    assert_eq!(rebuilt.origin(), MapperOrigin::Built);

    let strict_dir = tempdir().unwrap();
    let strict = MapperService::new(
        subject_database(strict_dir.path()),
        CacheSettings {
            rebuild_on_corrupt: false,
            ..CacheSettings::default()
        },
    );
    strict.get_mapper(SUBJECT, "identity", "nearest", false, &args).unwrap();
    let strict_cache = strict
        .database()
        .files(SUBJECT)
        .unwrap()
        .cache_path("identity", "pointnn");
    fs::write(&strict_cache, b"truncated").unwrap();
    assert!(matches!(
        strict.get_mapper(SUBJECT, "identity", "nearest", false, &args),
        Err(MapperError::Cache(_))
    ));
}

#[test]
fn test_configuration_errors() {
    let (_dir, service) = service(CacheSettings::default());
    assert!(matches!(
        service.get_mapper(SUBJECT, "identity", "bicubic", false, &KernelArgs::new()),
        Err(MapperError::UnknownProjection(_))
    ));
    assert!(matches!(
        service.get_mapper(SUBJECT, "identity", "nearest", false, &KernelArgs::new().with("std", 1.0)),
        Err(MapperError::InvalidKernelParameter(_))
    ));
    assert!(matches!(
        service.get_mapper("nobody", "identity", "nearest", false, &KernelArgs::new()),
        Err(MapperError::Database(_))
    ));
}

#[test]
fn test_patch_mapper_from_filesystem_database() {
    let dir = tempdir().unwrap();
    let db = FilesystemDatabase::new(dir.path());
    db.save_transform(SUBJECT, "identity", &AffineTransform::identity(grid()))
        .unwrap();
    let (left_fid, left_flat) = sheet(3, 3, [0.5, 0.5, 1.0], None);
    let (right_fid, right_flat) = sheet(3, 2, [1.5, 2.5, 2.0], None);
    for (side, fid, flat) in [
        (Hemisphere::Left, &left_fid, &left_flat),
        (Hemisphere::Right, &right_fid, &right_flat),
    ] {
        db.save_surface(SUBJECT, SurfaceKind::Fiducial, side, fid).unwrap();
        db.save_surface(SUBJECT, SurfaceKind::Flat, side, flat).unwrap();
    }

    let service = MapperService::new(db, CacheSettings::default());
    let mapper = service
        .get_mapper(SUBJECT, "identity", "const_patch_trilin", false, &KernelArgs::new())
        .unwrap();
    assert_eq!(mapper.to_string(), "<const_patch_trilin mapper with 15 vertices>");
    for (_, operator) in mapper.operators().iter() {
        for sum in operator.row_sums() {
            assert!((sum - 1.0).abs() < 1e-9, "row sum {}", sum);
        }
    }
    assert!(dir
        .path()
        .join(SUBJECT)
        .join("cache")
        .join("identity_constpatchtrilin_samples2.mapcache")
        .exists());
}
