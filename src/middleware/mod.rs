/*
 * Responsibility
 * - middleware public interface (re-export)
 */
pub mod http;
