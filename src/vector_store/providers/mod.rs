pub mod datacloud;
