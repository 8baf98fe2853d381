// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Projection kinds - the closed set of interpolation families a mapper can be built with.
*/

use crate::kernels::gaussian::CUTOFF_STDS;
use crate::kernels::PointKernel;
use crate::types::{KernelArgs, KernelDefaults, ProjectionError, ProjectionResult};
use cortimap_structures::VolumeShape;
use std::fmt::{Display, Formatter};

/// Largest barycentric resolution accepted for patch kinds.
pub const MAX_PATCH_SAMPLES: usize = 32;

/// Interpolation family used to build a sparse operator, with its kernel parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionKind {
    Nearest,
    Trilinear,
    Gaussian { std: f64 },
    Lanczos { window: usize },
    ConstPatchNearest { samples: usize },
    ConstPatchTrilinear { samples: usize },
    ConstPatchLanczos { samples: usize, window: usize },
}

/// Names accepted by [`ProjectionKind::from_name`].
pub const PROJECTION_NAMES: &[&str] = &[
    "nearest",
    "trilinear",
    "gaussian",
    "lanczos",
    "const_patch_nn",
    "const_patch_trilin",
    "const_patch_lanczos",
];

impl ProjectionKind {
    /// Resolves a kind by name using the built-in kernel defaults.
    pub fn from_name(name: &str, args: &KernelArgs) -> ProjectionResult<Self> {
        Self::from_name_with_defaults(name, args, &KernelDefaults::default())
    }

    /// Resolves a kind by name, taking unspecified parameters from `defaults`.
    ///
    /// Keywords the kind does not understand are rejected rather than ignored.
    pub fn from_name_with_defaults(
        name: &str,
        args: &KernelArgs,
        defaults: &KernelDefaults,
    ) -> ProjectionResult<Self> {
        let accepted: &[&str] = match name {
            "nearest" | "trilinear" => &[],
            "gaussian" => &["std"],
            "lanczos" => &["window"],
            "const_patch_nn" | "const_patch_trilin" => &["samples"],
            "const_patch_lanczos" => &["samples", "window"],
            other => return Err(ProjectionError::UnknownKind(other.to_string())),
        };
        if let Some((unexpected, _)) = args.iter().find(|(k, _)| !accepted.contains(k)) {
            return Err(ProjectionError::UnexpectedParameter {
                kind: name.to_string(),
                name: unexpected.to_string(),
            });
        }

        let window = || positive_integer(name, "window", args, defaults.lanczos_window);
        let samples = || positive_integer(name, "samples", args, defaults.patch_samples);

        Ok(match name {
            "nearest" => ProjectionKind::Nearest,
            "trilinear" => ProjectionKind::Trilinear,
            "gaussian" => {
                let std = args.get("std").unwrap_or(defaults.gaussian_std);
                if !(std.is_finite() && std > 0.0) {
                    return Err(ProjectionError::InvalidParameter {
                        kind: name.to_string(),
                        name: "std".to_string(),
                        value: std,
                        reason: "must be a positive finite number".to_string(),
                    });
                }
                ProjectionKind::Gaussian { std }
            }
            "lanczos" => ProjectionKind::Lanczos { window: window()? },
            "const_patch_nn" => ProjectionKind::ConstPatchNearest {
                samples: samples()?,
            },
            "const_patch_trilin" => ProjectionKind::ConstPatchTrilinear {
                samples: samples()?,
            },
            _ => ProjectionKind::ConstPatchLanczos {
                samples: samples()?,
                window: window()?,
            },
        })
    }

    /// The user-facing selector name.
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionKind::Nearest => "nearest",
            ProjectionKind::Trilinear => "trilinear",
            ProjectionKind::Gaussian { .. } => "gaussian",
            ProjectionKind::Lanczos { .. } => "lanczos",
            ProjectionKind::ConstPatchNearest { .. } => "const_patch_nn",
            ProjectionKind::ConstPatchTrilinear { .. } => "const_patch_trilin",
            ProjectionKind::ConstPatchLanczos { .. } => "const_patch_lanczos",
        }
    }

    /// The projection-type stem used in cache file names.
    pub fn cache_stem(&self) -> &'static str {
        match self {
            ProjectionKind::Nearest => "pointnn",
            ProjectionKind::Trilinear => "pointtrilin",
            ProjectionKind::Gaussian { .. } => "pointgauss",
            ProjectionKind::Lanczos { .. } => "pointlanczos",
            ProjectionKind::ConstPatchNearest { .. } => "constpatchnn",
            ProjectionKind::ConstPatchTrilinear { .. } => "constpatchtrilin",
            ProjectionKind::ConstPatchLanczos { .. } => "constpatchlanczos",
        }
    }

    /// The kernel evaluated at each sample location.
    pub fn point_kernel(&self) -> PointKernel {
        match *self {
            ProjectionKind::Nearest | ProjectionKind::ConstPatchNearest { .. } => {
                PointKernel::Nearest
            }
            ProjectionKind::Trilinear | ProjectionKind::ConstPatchTrilinear { .. } => {
                PointKernel::Trilinear
            }
            ProjectionKind::Gaussian { std } => PointKernel::Gaussian { std },
            ProjectionKind::Lanczos { window }
            | ProjectionKind::ConstPatchLanczos { window, .. } => PointKernel::Lanczos { window },
        }
    }

    /// Barycentric resolution for patch kinds; `None` for point kinds.
    pub fn patch_samples(&self) -> Option<usize> {
        match *self {
            ProjectionKind::ConstPatchNearest { samples }
            | ProjectionKind::ConstPatchTrilinear { samples }
            | ProjectionKind::ConstPatchLanczos { samples, .. } => Some(samples),
            _ => None,
        }
    }

    pub fn is_patch(&self) -> bool {
        self.patch_samples().is_some()
    }

    /// Kernel parameters carried by this kind, keyed by their keyword names.
    pub fn parameters(&self) -> KernelArgs {
        match *self {
            ProjectionKind::Nearest | ProjectionKind::Trilinear => KernelArgs::new(),
            ProjectionKind::Gaussian { std } => KernelArgs::new().with("std", std),
            ProjectionKind::Lanczos { window } => KernelArgs::new().with("window", window as f64),
            ProjectionKind::ConstPatchNearest { samples }
            | ProjectionKind::ConstPatchTrilinear { samples } => {
                KernelArgs::new().with("samples", samples as f64)
            }
            ProjectionKind::ConstPatchLanczos { samples, window } => KernelArgs::new()
                .with("samples", samples as f64)
                .with("window", window as f64),
        }
    }

    /// Rejects parameters whose footprint cannot fit `shape`.
    ///
    /// The gaussian cutoff radius and the lanczos window must not exceed the largest grid
    /// extent, and patch resolution is capped at [`MAX_PATCH_SAMPLES`].
    pub fn check_grid(&self, shape: &VolumeShape) -> ProjectionResult<()> {
        let extent = shape.z.max(shape.y).max(shape.x) as f64;
        let too_large = |name: &str, value: f64, reason: String| ProjectionError::InvalidParameter {
            kind: self.name().to_string(),
            name: name.to_string(),
            value,
            reason,
        };

        if let ProjectionKind::Gaussian { std } = *self {
            if CUTOFF_STDS * std > extent {
                return Err(too_large(
                    "std",
                    std,
                    format!("cutoff radius {} exceeds grid extent {}", CUTOFF_STDS * std, extent),
                ));
            }
        }
        if let ProjectionKind::Lanczos { window } | ProjectionKind::ConstPatchLanczos { window, .. } =
            *self
        {
            if window as f64 > extent {
                return Err(too_large(
                    "window",
                    window as f64,
                    format!("exceeds grid extent {}", extent),
                ));
            }
        }
        if let Some(samples) = self.patch_samples() {
            if samples > MAX_PATCH_SAMPLES {
                return Err(too_large(
                    "samples",
                    samples as f64,
                    format!("exceeds the maximum of {}", MAX_PATCH_SAMPLES),
                ));
            }
        }
        Ok(())
    }
}

impl Display for ProjectionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Cache file key for a resolved kind: the stem, followed by `_` and every kernel parameter
/// the kind carries as sorted `key+value` pairs (e.g. `pointgauss_std1.5`).
///
/// Parameters are taken from the kind rather than from the caller's keywords, so a default
/// and the same value passed explicitly share one file.
pub fn cache_key(kind: &ProjectionKind) -> String {
    let parameters = kind.parameters();
    if parameters.is_empty() {
        kind.cache_stem().to_string()
    } else {
        format!("{}_{}", kind.cache_stem(), parameters.suffix())
    }
}

fn positive_integer(
    kind: &str,
    name: &str,
    args: &KernelArgs,
    default: usize,
) -> ProjectionResult<usize> {
    let Some(value) = args.get(name) else {
        return Ok(default);
    };
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(ProjectionError::InvalidParameter {
            kind: kind.to_string(),
            name: name.to_string(),
            value,
            reason: "must be a positive integer".to_string(),
        })
    }
}
