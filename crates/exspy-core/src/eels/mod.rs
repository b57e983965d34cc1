//! Electron energy-loss spectroscopy: edge lookup, angle and mean-free-path
//! formulas, spectrum methods, deconvolution and Kramers-Kronig analysis.

pub mod angles;
pub mod deconvolution;
pub mod edges;
pub mod kramers_kronig;
pub mod spectrum;

pub use angles::{
    effective_collection_angle, imfp_angular_correction, imfp_iakoubovskii, imfp_tpp2m,
};
pub use deconvolution::{DeconvolutionError, DeconvolutionResult};
pub use edges::{
    get_edges_near_energy, get_info_from_edges, EdgeOrder, EdgeSearchError, EdgeSearchResult,
    NearbyEdge,
};
pub use kramers_kronig::{
    eels_proportionality_constant, DielectricFunction, KramersKronigError, KramersKronigOptions,
    KramersKronigOutput, KramersKronigResult,
};
pub use spectrum::{
    EelsError, EelsResult, EelsSpectrum, ElasticReference, ThicknessEstimate,
};
