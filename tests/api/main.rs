mod health_check;
mod helpers;
mod index;
mod weather;
