mod dof;
mod element;
mod reference_map;
