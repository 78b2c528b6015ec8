mod capsules;
mod validate;
