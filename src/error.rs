// Copyright 2025 Loadstone Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::fmt;

use crate::io::AssetIoError;

/// Asset server error type
#[derive(Debug, Clone)]
pub enum AssetServerError {
    /// No loader is registered for any suffix of the file name
    MissingAssetLoader,

    /// An untyped handle was converted to a handle of the wrong type
    IncorrectHandleType,

    /// The loader failed to decode the asset's bytes
    AssetLoaderError,

    /// The byte-loading backend failed
    AssetIoError(AssetIoError),

    /// `load_folder` was called on a path that is not a directory
    AssetFolderNotADirectory,
}

impl fmt::Display for AssetServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetServerError::MissingAssetLoader => {
                write!(f, "No asset loader registered for this extension")
            }
            AssetServerError::IncorrectHandleType => {
                write!(f, "Attempted to convert an untyped handle to an incorrect type")
            }
            AssetServerError::AssetLoaderError => write!(f, "Asset loader failed to decode asset"),
            AssetServerError::AssetIoError(err) => write!(f, "Asset IO error: {err}"),
            AssetServerError::AssetFolderNotADirectory => {
                write!(f, "Asset folder path is not a directory")
            }
        }
    }
}

impl std::error::Error for AssetServerError {}

impl From<AssetIoError> for AssetServerError {
    fn from(err: AssetIoError) -> Self {
        AssetServerError::AssetIoError(err)
    }
}

/// Result type alias using [`AssetServerError`]
pub type Result<T> = std::result::Result<T, AssetServerError>;
