mod helpers;
mod lookup;
mod provenance;
