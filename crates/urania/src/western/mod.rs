pub mod dispositors;
pub mod houses;
pub mod rulers;

pub use dispositors::{
    analyze, analyze_across_systems, analyze_by_house, analyze_by_sign, rulership_chains,
    DispositorAnalysis, DispositorLink, DispositorResult,
};
pub use houses::{cusp_signs, house_of_degree, valid_cusps, HOUSE_COUNT};
pub use rulers::{
    sign_index, sign_name, sign_rulers, sign_rulers_from_longitude, RulershipScheme, SIGN_NAMES,
};
