use nalgebra::{Matrix4, Point3};

/// A complex's workspace ↔ local coordinate transform, captured once when a
/// minimization run starts.
///
/// The snapshot is deliberately frozen for the run's duration: if the host scene
/// moves or reparents a participating complex mid-run, positions published from
/// engine frames will be stale relative to that edit. This is a documented
/// limitation of the session model, not something the pipeline detects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexTransform {
    local_to_workspace: Matrix4<f64>,
    workspace_to_local: Matrix4<f64>,
}

impl ComplexTransform {
    /// Captures a transform from a local → workspace matrix.
    ///
    /// Returns `None` if the matrix is not invertible (a degenerate scene
    /// transform); callers typically fall back to identity.
    pub fn from_matrix(local_to_workspace: Matrix4<f64>) -> Option<Self> {
        let workspace_to_local = local_to_workspace.try_inverse()?;
        Some(Self {
            local_to_workspace,
            workspace_to_local,
        })
    }

    /// The identity transform (local space == workspace space).
    pub fn identity() -> Self {
        Self {
            local_to_workspace: Matrix4::identity(),
            workspace_to_local: Matrix4::identity(),
        }
    }

    /// Converts a complex-local position to workspace-absolute space.
    pub fn to_workspace(&self, position: &Point3<f64>) -> Point3<f64> {
        self.local_to_workspace.transform_point(position)
    }

    /// Converts a workspace-absolute position into the complex's local space.
    pub fn to_local(&self, position: &Point3<f64>) -> Point3<f64> {
        self.workspace_to_local.transform_point(position)
    }
}

impl Default for ComplexTransform {
    fn default() -> Self {
        Self::identity()
    }
}
